use crate::content::{self, AppContent, DataStore, ProjectType};
use crate::dialogs::NativeDialogs;
use crate::field::decode_data_url;
use crate::{
    BoundField, ContentStore, ContentValue, EditorConfig, ExportFormat, FieldKind, Language,
    LoadSource, StoreEvent, statics,
};
use eframe::egui;
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, mpsc::Receiver},
    time::Duration,
};

pub fn run_gui(config: EditorConfig) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 900.0]),
        ..Default::default()
    };
    let title = format!("{} {}", statics::EN_APP_TITLE, env!("CARGO_PKG_VERSION"));
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            let store = config.open_store(Box::new(NativeDialogs))?;
            Ok(Box::new(FolioApp::new(store)))
        }),
    )
}

/// Page anchors reachable from the nav bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Experience,
    Portfolio,
    Life,
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Title,
    Heading,
    Strong,
    Body,
    Weak,
}

impl Role {
    fn rich(self, text: &str) -> egui::RichText {
        let rich = egui::RichText::new(text);
        match self {
            Role::Title => rich.size(30.0).strong(),
            Role::Heading => rich.heading(),
            Role::Strong => rich.strong(),
            Role::Body => rich,
            Role::Weak => rich.weak(),
        }
    }

    fn text_style(self) -> egui::TextStyle {
        match self {
            Role::Title | Role::Heading => egui::TextStyle::Heading,
            _ => egui::TextStyle::Body,
        }
    }
}

/// Top bar requests. Applied after the page is drawn so a field that loses
/// focus to the click commits under the language it was edited in.
#[derive(Debug, Clone, Copy)]
enum Action {
    SetLanguage(Language),
    ToggleEditing,
    Export(ExportFormat),
    Reset,
    ToggleTheme,
}

/// Decoded image bytes keyed by field path, rebuilt when the value changes.
struct CachedImage {
    source: String,
    uri: String,
    bytes: Option<Arc<[u8]>>,
}

/// List lengths and identities needed to lay out the sequence sections.
#[derive(Debug, Clone, Default)]
struct Outline {
    projects: Vec<ProjectOutline>,
    experience_logos: Vec<bool>,
    life_items: usize,
}

#[derive(Debug, Clone)]
struct ProjectOutline {
    id: String,
    kind: ProjectType,
    tags: Vec<String>,
    challenge_image: bool,
    process_image: bool,
    solution_image: bool,
    feature_images: Vec<bool>,
}

impl Outline {
    fn from_content(content: &AppContent) -> Self {
        Self {
            projects: content
                .portfolio
                .items
                .iter()
                .map(|p| ProjectOutline {
                    id: p.id.clone(),
                    kind: p.kind,
                    tags: p.tags.clone(),
                    challenge_image: p.challenge.image.is_some(),
                    process_image: p.process.image.is_some(),
                    solution_image: p.solution.image.is_some(),
                    feature_images: p
                        .solution
                        .features
                        .iter()
                        .map(|f| f.image.is_some())
                        .collect(),
                })
                .collect(),
            experience_logos: content
                .experience
                .items
                .iter()
                .map(|e| e.logo.is_some())
                .collect(),
            life_items: content.life.items.len(),
        }
    }
}

struct FolioApp {
    store: ContentStore,
    events: Receiver<StoreEvent>,
    typed: Option<DataStore>,
    fields: HashMap<String, BoundField>,
    images: HashMap<String, CachedImage>,
    image_generation: u64,
    selected_project_id: Option<String>,
    zoomed: Option<String>,
    scroll_target: Option<Section>,
    dialog_dir: Option<PathBuf>,
    theme_dark: bool,
    status: String,
    last_error: Option<String>,
}

impl FolioApp {
    fn new(mut store: ContentStore) -> Self {
        let events = store.subscribe();
        let status = match store.load_source() {
            LoadSource::Persisted => statics::EN_STATUS_LOADED_PERSISTED,
            LoadSource::Default => statics::EN_STATUS_LOADED_DEFAULT,
        };
        let mut app = Self {
            store,
            events,
            typed: None,
            fields: HashMap::new(),
            images: HashMap::new(),
            image_generation: 0,
            selected_project_id: None,
            zoomed: None,
            scroll_target: None,
            dialog_dir: None,
            theme_dark: true,
            status: status.to_string(),
            last_error: None,
        };
        let tree = app.store.content().clone();
        app.refresh_typed(&tree);
        app
    }

    fn refresh_typed(&mut self, tree: &ContentValue) {
        match content::typed(tree) {
            Ok(data) => self.typed = Some(data),
            Err(e) => {
                tracing::warn!("typed view unavailable: {e:#}");
                self.typed = None;
                self.last_error = Some(format!("{} {e:#}", statics::EN_ERR_CONTENT_SHAPE));
            }
        }
    }

    fn outline(&self) -> Option<Outline> {
        self.typed
            .as_ref()
            .map(|data| Outline::from_content(data.get(self.store.language())))
    }

    fn drain_events(&mut self) {
        let events: Vec<StoreEvent> = self.events.try_iter().collect();
        for event in events {
            match event {
                StoreEvent::Content { revision, tree } => {
                    tracing::trace!(revision, "content changed");
                    self.refresh_typed(&tree);
                    if self.store.last_persist_error().is_none() {
                        self.status = statics::EN_STATUS_SAVED.to_string();
                    }
                }
                StoreEvent::Language(lang) => tracing::trace!(%lang, "language changed"),
                StoreEvent::Editing(editing) => tracing::trace!(editing, "editing changed"),
            }
        }
    }

    /// Commit every field that still holds focus-time edits; used before
    /// anything that would hide or re-target the inputs.
    fn commit_pending(&mut self) {
        for field in self.fields.values_mut().filter(|f| f.is_editing()) {
            if let Err(e) = field.commit(&mut self.store) {
                self.last_error = Some(format!("{} {e}", statics::EN_ERR_FIELD_WRITE));
            }
        }
    }

    fn poll_uploads(&mut self, ctx: &egui::Context) {
        let mut busy = false;
        for field in self.fields.values_mut() {
            // Failures are alerted by the field itself.
            let _ = field.poll_upload(&mut self.store);
            busy |= field.is_processing();
        }
        if busy {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::SetLanguage(lang) => {
                self.commit_pending();
                self.store.set_language(lang);
            }
            Action::ToggleEditing => {
                self.commit_pending();
                self.store.toggle_editing();
            }
            Action::Export(format) => {
                self.commit_pending();
                self.export(format);
            }
            Action::Reset => {
                if self.store.reset() {
                    self.selected_project_id = None;
                    self.status = statics::EN_STATUS_RESET.to_string();
                }
            }
            Action::ToggleTheme => {
                self.theme_dark = !self.theme_dark;
                if self.theme_dark {
                    ctx.set_visuals(egui::Visuals::dark());
                } else {
                    ctx.set_visuals(egui::Visuals::light());
                }
            }
        }
    }

    fn export(&mut self, format: ExportFormat) {
        let file = self.store.export(format);
        let mut dlg = rfd::FileDialog::new()
            .add_filter(format.extension(), &[format.extension()])
            .set_file_name(file.file_name);
        if let Some(dir) = self.dialog_dir.clone() {
            dlg = dlg.set_directory(dir);
        }
        let Some(path) = dlg.save_file() else {
            return;
        };
        match file.write_to(&path) {
            Ok(()) => {
                self.dialog_dir = path.parent().map(PathBuf::from);
                self.status = format!("{} {}", statics::EN_STATUS_EXPORTED, path.display());
            }
            Err(e) => self.last_error = Some(format!("{} {e:#}", statics::EN_ERR_EXPORT)),
        }
    }

    fn image_source(
        &mut self,
        ctx: &egui::Context,
        path: &str,
        value: &str,
    ) -> egui::ImageSource<'static> {
        let stale = self.images.get(path).is_none_or(|c| c.source != value);
        if stale {
            if let Some(old) = self.images.remove(path)
                && old.bytes.is_some()
            {
                ctx.forget_image(&old.uri);
            }
            self.image_generation += 1;
            let cached = match decode_data_url(value) {
                Some((mime, bytes)) => CachedImage {
                    source: value.to_string(),
                    uri: format!(
                        "bytes://folio/{path}/{}.{}",
                        self.image_generation,
                        extension_for_mime(mime)
                    ),
                    bytes: Some(bytes.into()),
                },
                None => CachedImage {
                    source: value.to_string(),
                    uri: value.to_string(),
                    bytes: None,
                },
            };
            self.images.insert(path.to_string(), cached);
        }
        match self.images.get(path) {
            Some(CachedImage {
                uri,
                bytes: Some(bytes),
                ..
            }) => egui::ImageSource::Bytes {
                uri: uri.clone().into(),
                bytes: egui::load::Bytes::Shared(bytes.clone()),
            },
            Some(cached) => egui::ImageSource::Uri(cached.uri.clone().into()),
            None => egui::ImageSource::Uri(value.to_string().into()),
        }
    }

    fn text_field(&mut self, ui: &mut egui::Ui, path: &str, kind: FieldKind, role: Role) {
        let editing = self.store.is_editing();
        let field = self
            .fields
            .entry(path.to_string())
            .or_insert_with(|| BoundField::new(path, kind));
        field.sync(&self.store);

        if !editing {
            ui.label(role.rich(field.value()));
            return;
        }

        let response = match kind {
            FieldKind::MultiLine => ui.add(
                egui::TextEdit::multiline(field.buffer_mut())
                    .desired_rows(3)
                    .desired_width(f32::INFINITY)
                    .hint_text(statics::EN_PLACEHOLDER_TEXT),
            ),
            _ => {
                let char_width = ui.text_style_height(&role.text_style()) * 0.6;
                let width = field.input_width_chars() as f32 * char_width + 12.0;
                ui.add(
                    egui::TextEdit::singleline(field.buffer_mut())
                        .font(role.text_style())
                        .desired_width(width)
                        .hint_text(statics::EN_PLACEHOLDER_TEXT),
                )
            }
        };

        if response.has_focus() && !field.is_editing() {
            field.begin_edit();
        }
        if response.lost_focus()
            && let Err(e) = field.commit(&mut self.store)
        {
            self.last_error = Some(format!("{} {e}", statics::EN_ERR_FIELD_WRITE));
        }
    }

    fn image_field(&mut self, ui: &mut egui::Ui, path: &str, size: egui::Vec2, zoomable: bool) {
        let editing = self.store.is_editing();
        let value = {
            let field = self
                .fields
                .entry(path.to_string())
                .or_insert_with(|| BoundField::new(path, FieldKind::Image));
            field.sync(&self.store);
            field.value().to_string()
        };

        ui.vertical(|ui| {
            let response = if value.is_empty() {
                ui.add_sized(size, egui::Label::new(statics::EN_ALT_IMAGE))
            } else {
                let source = self.image_source(ui.ctx(), path, &value);
                ui.add(
                    egui::Image::new(source)
                        .max_size(size)
                        .sense(egui::Sense::click()),
                )
            };

            let Some(field) = self.fields.get_mut(path) else {
                return;
            };
            if editing {
                if field.is_processing() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(statics::EN_LABEL_PROCESSING);
                    });
                } else if ui.button(statics::EN_BTN_CHANGE_PHOTO).clicked() {
                    let mut dlg = rfd::FileDialog::new()
                        .add_filter(statics::IMAGE_FILTER_NAME, statics::IMAGE_EXTENSIONS);
                    if let Some(dir) = self.dialog_dir.clone() {
                        dlg = dlg.set_directory(dir);
                    }
                    if let Some(file) = dlg.pick_file() {
                        self.dialog_dir = file.parent().map(PathBuf::from);
                        field.start_upload(file);
                        ui.ctx().request_repaint();
                    }
                }
            } else if zoomable
                && !value.is_empty()
                && response.on_hover_text(statics::EN_HINT_ZOOM).clicked()
            {
                self.zoomed = Some(path.to_string());
            }
        });
    }

    fn nav_item(&mut self, ui: &mut egui::Ui, path: &str, section: Section) {
        if self.store.is_editing() {
            self.text_field(ui, path, FieldKind::Text, Role::Body);
            return;
        }
        let field = self
            .fields
            .entry(path.to_string())
            .or_insert_with(|| BoundField::new(path, FieldKind::Text));
        field.sync(&self.store);
        if ui.link(field.value()).clicked() {
            self.scroll_target = Some(section);
        }
    }

    fn anchor(&mut self, ui: &mut egui::Ui, section: Section) {
        let response = ui.separator();
        if self.scroll_target == Some(section) {
            response.scroll_to_me(Some(egui::Align::TOP));
            self.scroll_target = None;
        }
    }

    fn render_page(&mut self, ui: &mut egui::Ui, outline: Option<&Outline>) {
        ui.horizontal_wrapped(|ui| {
            self.nav_item(ui, "nav.work", Section::Experience);
            self.nav_item(ui, "nav.portfolio", Section::Portfolio);
            self.nav_item(ui, "nav.life", Section::Life);
            self.nav_item(ui, "nav.contact", Section::Contact);
        });
        ui.add_space(12.0);

        // Hero
        ui.horizontal(|ui| {
            self.image_field(ui, "hero.image", egui::vec2(220.0, 220.0), false);
            ui.vertical(|ui| {
                self.text_field(ui, "hero.name", FieldKind::Text, Role::Title);
                self.text_field(ui, "hero.title", FieldKind::Text, Role::Heading);
                self.text_field(ui, "hero.subtitle", FieldKind::MultiLine, Role::Body);
                ui.add_space(8.0);
                self.text_field(ui, "hero.cta", FieldKind::Text, Role::Strong);
            });
        });

        let Some(outline) = outline else {
            return;
        };

        self.anchor(ui, Section::Experience);
        self.text_field(ui, "experience.title", FieldKind::Text, Role::Heading);
        for (i, has_logo) in outline.experience_logos.iter().enumerate() {
            let base = format!("experience.items.{i}");
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    if *has_logo {
                        self.image_field(ui, &format!("{base}.logo"), egui::vec2(48.0, 48.0), false);
                    }
                    ui.vertical(|ui| {
                        ui.horizontal(|ui| {
                            self.text_field(ui, &format!("{base}.company"), FieldKind::Text, Role::Strong);
                            self.text_field(ui, &format!("{base}.period"), FieldKind::Text, Role::Weak);
                        });
                        self.text_field(ui, &format!("{base}.role"), FieldKind::Text, Role::Body);
                        self.text_field(ui, &format!("{base}.description"), FieldKind::MultiLine, Role::Body);
                    });
                });
            });
        }

        self.anchor(ui, Section::Portfolio);
        self.text_field(ui, "portfolio.title", FieldKind::Text, Role::Heading);
        self.text_field(ui, "portfolio.subtitle", FieldKind::MultiLine, Role::Weak);
        for (i, project) in outline.projects.iter().enumerate() {
            let base = format!("portfolio.items.{i}");
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    self.image_field(ui, &format!("{base}.thumbnail"), egui::vec2(200.0, 130.0), false);
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(kind_label(project.kind)).weak());
                        self.text_field(ui, &format!("{base}.title"), FieldKind::Text, Role::Strong);
                        self.text_field(ui, &format!("{base}.shortDescription"), FieldKind::MultiLine, Role::Body);
                        ui.horizontal_wrapped(|ui| {
                            for tag in &project.tags {
                                ui.label(egui::RichText::new(tag).small().weak());
                            }
                        });
                        if ui.button(statics::EN_BTN_VIEW_PROJECT).clicked() {
                            self.selected_project_id = Some(project.id.clone());
                        }
                    });
                });
            });
        }

        self.anchor(ui, Section::Life);
        self.text_field(ui, "life.slogan", FieldKind::Text, Role::Heading);
        ui.horizontal_wrapped(|ui| {
            for i in 0..outline.life_items {
                let base = format!("life.items.{i}");
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_max_width(240.0);
                    ui.vertical(|ui| {
                        self.image_field(ui, &format!("{base}.image"), egui::vec2(220.0, 160.0), true);
                        self.text_field(ui, &format!("{base}.title"), FieldKind::Text, Role::Strong);
                        self.text_field(ui, &format!("{base}.description"), FieldKind::MultiLine, Role::Body);
                    });
                });
            }
        });

        self.anchor(ui, Section::Contact);
        ui.horizontal(|ui| {
            self.image_field(ui, "footer.qrcode", egui::vec2(120.0, 120.0), true);
            ui.vertical(|ui| {
                self.text_field(ui, "footer.message", FieldKind::MultiLine, Role::Body);
                self.text_field(ui, "footer.copyright", FieldKind::Text, Role::Weak);
            });
        });
    }

    fn render_project(&mut self, ui: &mut egui::Ui, index: usize, project: &ProjectOutline) {
        let base = format!("portfolio.items.{index}");
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(kind_label(project.kind)).weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(statics::EN_BTN_CLOSE).clicked() {
                    self.selected_project_id = None;
                }
            });
        });
        self.text_field(ui, &format!("{base}.title"), FieldKind::Text, Role::Title);

        egui::Grid::new("detail_header").num_columns(2).show(ui, |ui| {
            for (heading, key) in [
                (statics::EN_HEADING_TIMELINE, "timeline"),
                (statics::EN_HEADING_ROLE, "role"),
                (statics::EN_HEADING_IMPACT, "impact"),
            ] {
                ui.label(egui::RichText::new(heading).weak());
                self.text_field(ui, &format!("{base}.detailHeader.{key}"), FieldKind::Text, Role::Strong);
                ui.end_row();
            }
        });

        for (section, has_image) in [
            ("challenge", project.challenge_image),
            ("process", project.process_image),
            ("solution", project.solution_image),
        ] {
            let at = format!("{base}.{section}");
            ui.separator();
            self.text_field(ui, &format!("{at}.title"), FieldKind::Text, Role::Heading);
            self.text_field(ui, &format!("{at}.content"), FieldKind::MultiLine, Role::Body);
            if has_image {
                self.image_field(ui, &format!("{at}.image"), egui::vec2(400.0, 260.0), true);
                self.text_field(ui, &format!("{at}.imageCaption"), FieldKind::Text, Role::Weak);
            }
        }

        for (i, has_image) in project.feature_images.iter().enumerate() {
            let at = format!("{base}.solution.features.{i}");
            egui::Frame::group(ui.style()).show(ui, |ui| {
                self.text_field(ui, &format!("{at}.title"), FieldKind::Text, Role::Strong);
                self.text_field(ui, &format!("{at}.description"), FieldKind::MultiLine, Role::Body);
                if *has_image {
                    self.image_field(ui, &format!("{at}.image"), egui::vec2(360.0, 220.0), true);
                }
            });
        }
    }
}

fn kind_label(kind: ProjectType) -> &'static str {
    match kind {
        ProjectType::Mobile => statics::EN_KIND_MOBILE,
        ProjectType::Desktop => statics::EN_KIND_DESKTOP,
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

impl eframe::App for FolioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_uploads(ctx);
        self.drain_events();

        let mut action = None;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                let lang = self.store.language();
                for (code, label) in [
                    (Language::Zh, statics::EN_LANG_ZH),
                    (Language::En, statics::EN_LANG_EN),
                ] {
                    if ui.selectable_label(lang == code, label).clicked() {
                        action = Some(Action::SetLanguage(code));
                    }
                }

                ui.separator();
                let edit_label = if self.store.is_editing() {
                    statics::EN_BTN_SAVE_EXIT
                } else {
                    statics::EN_BTN_EDIT
                };
                if ui.button(edit_label).clicked() {
                    action = Some(Action::ToggleEditing);
                }

                if self.store.is_editing() {
                    if ui.button(statics::EN_BTN_EXPORT_MODULE).clicked() {
                        action = Some(Action::Export(ExportFormat::Module));
                    }
                    if ui.button(statics::EN_BTN_EXPORT_JSON).clicked() {
                        action = Some(Action::Export(ExportFormat::Json));
                    }
                    if ui.button(statics::EN_BTN_RESET).clicked() {
                        action = Some(Action::Reset);
                    }
                }

                ui.separator();
                if ui.button(statics::EN_BTN_TOGGLE_THEME).clicked() {
                    action = Some(Action::ToggleTheme);
                }
            });
        });

        if self.store.is_editing() {
            egui::TopBottomPanel::top("editing_banner").show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.colored_label(egui::Color32::from_rgb(0x4f, 0x8c, 0xff), statics::EN_BANNER_EDITING);
                });
            });
        }

        if let Some(err) = self.last_error.clone() {
            egui::TopBottomPanel::top("error_bar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::RED, err);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(statics::EN_BTN_CLEAR).clicked() {
                            self.last_error = None;
                        }
                    });
                });
            });
        }

        egui::TopBottomPanel::bottom("bottom_status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{} {}", statics::EN_LABEL_LANGUAGE, self.store.language()));
                ui.separator();
                ui.label(format!("{} {}", statics::EN_LABEL_REVISION, self.store.revision()));
                if let Some(err) = self.store.last_persist_error() {
                    ui.separator();
                    ui.colored_label(egui::Color32::YELLOW, statics::EN_BADGE_UNSAVED)
                        .on_hover_text(err);
                }
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        let outline = self.outline();

        if let Some(id) = self.selected_project_id.clone() {
            let index = self
                .typed
                .as_ref()
                .and_then(|data| content::project_index(data.get(self.store.language()), &id));
            let project = index.and_then(|i| outline.as_ref()?.projects.get(i).cloned().map(|p| (i, p)));
            match project {
                Some((index, project)) => {
                    egui::SidePanel::right("project_drawer")
                        .resizable(true)
                        .default_width(460.0)
                        .show(ctx, |ui| {
                            egui::ScrollArea::vertical().show(ui, |ui| {
                                self.render_project(ui, index, &project);
                            });
                        });
                }
                None => self.selected_project_id = None,
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_page(ui, outline.as_ref());
            });
        });

        if let Some(path) = self.zoomed.clone() {
            let value = self
                .store
                .read(&path)
                .map(ContentValue::display_text)
                .unwrap_or_default();
            let source = self.image_source(ctx, &path, &value);
            let mut open = true;
            let mut clicked = false;
            egui::Window::new(statics::EN_WINDOW_ZOOM)
                .collapsible(false)
                .open(&mut open)
                .show(ctx, |ui| {
                    clicked = ui
                        .add(
                            egui::Image::new(source)
                                .max_size(egui::vec2(900.0, 700.0))
                                .sense(egui::Sense::click()),
                        )
                        .clicked();
                });
            if !open || clicked {
                self.zoomed = None;
            }
        }

        if let Some(action) = action {
            self.apply(ctx, action);
        }
    }
}
