use folio::{ContentPath, ContentValue, Language, PathError, path};
use pretty_assertions::assert_eq;

fn p(s: &str) -> ContentPath {
    s.parse().expect("valid path")
}

fn sample() -> ContentValue {
    ContentValue::parse(
        r#"{
            zh: { hero: { name: "A" }, portfolio: { items: [{ id: "p1", title: "一" }] } },
            en: { hero: { name: "B" }, portfolio: { items: [{ id: "p1", title: "One" }] } },
        }"#,
    )
    .expect("sample parses")
}

#[test]
fn writing_one_language_leaves_the_other_alone() {
    let tree = sample();
    let next = path::write(&tree, &p("zh.hero.name"), "C".into()).unwrap();

    assert_eq!(path::read(&next, &p("zh.hero.name")), Some(&ContentValue::from("C")));
    assert_eq!(path::read(&next, &p("en.hero.name")), Some(&ContentValue::from("B")));
    assert_eq!(path::read(&tree, &p("zh.hero.name")), Some(&ContentValue::from("A")));
}

#[test]
fn write_then_read_returns_the_written_value() {
    let tree = sample();
    for (at, value) in [
        ("zh.portfolio.items.0.title", "改"),
        ("en.portfolio.items.0.challenge.title", "The problem"),
        ("en.footer.qrcode", "data:image/png;base64,AA=="),
        ("zh.life.items.2.description", "深夜"),
    ] {
        let next = path::write(&tree, &p(at), value.into()).unwrap();
        assert_eq!(path::read(&next, &p(at)), Some(&ContentValue::from(value)), "{at}");
    }
}

#[test]
fn unrelated_leaves_survive_a_write() {
    let tree = sample();
    let next = path::write(&tree, &p("en.portfolio.items.0.title"), "Renamed".into()).unwrap();
    assert_eq!(
        path::read(&next, &p("en.portfolio.items.0.id")),
        Some(&ContentValue::from("p1"))
    );
    assert_eq!(path::read(&next, &p("zh.portfolio.items.0")), path::read(&tree, &p("zh.portfolio.items.0")));
}

#[test]
fn language_relative_paths_resolve_under_each_root() {
    let tree = sample();
    let rel = p("portfolio.items.0.title");
    assert_eq!(
        path::read(&tree, &rel.under(Language::Zh)),
        Some(&ContentValue::from("一"))
    );
    assert_eq!(
        path::read(&tree, &rel.under(Language::En)),
        Some(&ContentValue::from("One"))
    );
    assert_eq!(rel.under(Language::En).to_string(), "en.portfolio.items.0.title");
}

#[test]
fn missing_paths_read_as_absent() {
    let tree = sample();
    for at in [
        "zh.nav.work",
        "en.portfolio.items.5.title",
        "zh.hero.name.first",
        "fr.hero.name",
    ] {
        assert_eq!(path::read(&tree, &p(at)), None, "{at}");
    }
}

#[test]
fn malformed_paths_are_rejected() {
    for bad in ["", "a..b", ".a", "a."] {
        assert!(bad.parse::<ContentPath>().is_err(), "{bad:?}");
    }
}

#[test]
fn reading_past_the_end_of_a_sequence_is_blank() {
    let tree = ContentValue::parse(
        r#"{"portfolio": {"items": [{"title": "a"}, {"title": "b"}]}}"#,
    )
    .unwrap();
    assert_eq!(path::read(&tree, &p("portfolio.items.1.title")), Some(&ContentValue::from("b")));
    assert_eq!(path::read(&tree, &p("portfolio.items.2.title")), None);
}

#[test]
fn naming_a_key_inside_a_sequence_keeps_every_item() {
    let tree = sample();
    assert!(matches!(
        path::write(&tree, &p("zh.portfolio.items.extra"), "x".into()),
        Err(PathError::NotAContainer { position: 3, .. })
    ));
    assert_eq!(
        path::read(&tree, &p("zh.portfolio.items.0.id")),
        Some(&ContentValue::from("p1"))
    );
}

#[test]
fn out_of_reach_indices_fail_instead_of_aborting() {
    let tree = sample();
    for at in [
        format!("en.portfolio.items.{}", usize::MAX),
        "en.portfolio.items.1000000000000.title".to_string(),
    ] {
        assert!(
            matches!(
                path::write(&tree, &p(&at), "x".into()),
                Err(PathError::IndexOutOfRange { len: 1, .. })
            ),
            "{at}"
        );
    }
}
