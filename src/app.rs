use crate::canvas::Canvas;
use crate::config;
use crate::cropper::OrderedPath;
use crate::error::{ErrorKind, PlacementError};
use crate::session::Session;
use crate::tool::Tool;
use crate::ui::UiState;
use clipboard::ClipboardContext;
use clipboard::ClipboardProvider;
use egui::{Color32, Context, Stroke, Ui};
use egui_extras::RetainedImage;
use image::{DynamicImage, RgbaImage};
use rfd::{MessageButtons, MessageDialog, MessageLevel};

struct CropPreview {
    image: RgbaImage,
    texture: RetainedImage,
}

pub struct StringArtistApp {
    canvas: Canvas,
    session: Session,
    ui_state: UiState,
    clipboard: Option<ClipboardContext>,
    background_texture: Option<RetainedImage>,
    path_overlay: Option<OrderedPath>,
    crop_preview: Option<CropPreview>,
}

fn retained_image(name: &str, image: &RgbaImage) -> RetainedImage {
    let size = [image.width() as usize, image.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    RetainedImage::from_color_image(name, color_image)
}

fn show_message(level: MessageLevel, title: &str, text: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(text)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn report_placement_error(title: &str, err: &PlacementError) {
    match err.kind() {
        ErrorKind::Validation => {
            log::warn!("{}: {}", title, err);
            show_message(MessageLevel::Warning, title, &format!("Invalid file\n\n{}", err));
        }
        ErrorKind::NotEnoughData => {
            log::info!("{}: {}", title, err);
            show_message(MessageLevel::Info, "Not Enough Points", &err.to_string());
        }
        ErrorKind::Resource | ErrorKind::NoTarget => {
            log::error!("{}: {}", title, err);
            show_message(MessageLevel::Error, title, &err.to_string());
        }
    }
}

impl StringArtistApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.spacing.item_spacing = egui::vec2(10.0, 10.0);
        cc.egui_ctx.set_style(style);

        Self {
            canvas: Canvas::new(0.0, 0.0),
            session: Session::new(),
            ui_state: UiState::default(),
            clipboard: ClipboardProvider::new().ok(),
            background_texture: None,
            path_overlay: None,
            crop_preview: None,
        }
    }

    pub fn copy_to_clipboard(&mut self, text: String) -> bool {
        if let Some(clipboard) = &mut self.clipboard {
            clipboard.set_contents(text).is_ok()
        } else {
            false
        }
    }

    /// Uploads a downsampled copy of the background for display.
    fn refresh_background_texture(&mut self) {
        self.path_overlay = None;
        self.background_texture = self.session.background().map(|bg| {
            let preview = if bg.width().max(bg.height()) > config::MAX_PREVIEW_SIDE {
                bg.image()
                    .thumbnail(config::MAX_PREVIEW_SIDE, config::MAX_PREVIEW_SIDE)
            } else {
                bg.image().clone()
            };
            retained_image("background", &preview.to_rgba8())
        });
    }

    fn run_tool(&mut self, tool: Tool) {
        log::debug!("Tool selected: {}", tool);
        if tool.is_mode() {
            self.ui_state.selected_tool = Some(tool);
            self.ui_state.status = format!("{} tool selected", tool);
            return;
        }
        match tool {
            Tool::ExportPositions => self.export_positions(),
            Tool::ExportPattern => self.export_pattern(),
            Tool::ImportPositions => self.import_positions(),
            Tool::Background => self.choose_background(),
            Tool::SmartCrop => self.smart_crop(),
            Tool::Nail | Tool::Erase | Tool::Prioritize => {}
        }
    }

    fn choose_background(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Choose Background Image")
            .add_filter("Images", config::IMAGE_EXTENSIONS)
            .pick_file()
        else {
            log::info!("No background image chosen");
            return;
        };

        match self.session.load_background(&path) {
            Ok(()) => {
                self.refresh_background_texture();
                self.ui_state.status = format!("Loaded {}", path.display());
            }
            Err(e) => report_placement_error("Background Error", &e),
        }
    }

    fn export_positions(&mut self) {
        match self.session.export_positions() {
            Ok(path) => {
                self.ui_state.status = format!("Positions saved to {}", path.display());
                show_message(
                    MessageLevel::Info,
                    "File Saved",
                    &format!("File saved to {}", path.display()),
                );
            }
            Err(e) => report_placement_error("Export Error", &e),
        }
    }

    fn export_pattern(&mut self) {
        match self.session.export_pattern() {
            Ok(path) => {
                self.ui_state.status = format!("Pattern saved to {}", path.display());
                show_message(
                    MessageLevel::Info,
                    "File Saved",
                    &format!("Pattern saved to {}", path.display()),
                );
            }
            Err(e) => report_placement_error("Export Error", &e),
        }
    }

    fn import_positions(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Import Nail Positions")
            .add_filter("Nail positions", &["json"])
            .add_filter("String art pattern", &[config::PATTERN_EXTENSION])
            .add_filter("All Files", &["*"])
            .pick_file()
        else {
            return;
        };

        if !path.is_file() {
            show_message(
                MessageLevel::Warning,
                "Import Error",
                &format!("Couldn't find file {}!", path.display()),
            );
            return;
        }

        match self.session.import_positions(&path) {
            Ok(count) => {
                self.refresh_background_texture();
                self.ui_state.status = format!("Imported {} nails from {}", count, path.display());
            }
            Err(e) => report_placement_error("Import Error", &e),
        }
    }

    fn smart_crop(&mut self) {
        match self.session.smart_crop() {
            Ok((cropper, image)) => {
                self.ui_state.status = format!("Cropped along {} nails", cropper.path().len());
                let texture = retained_image("crop", &image);
                self.path_overlay = Some(cropper.path().clone());
                self.crop_preview = Some(CropPreview { image, texture });
            }
            Err(e) => {
                let level = match e.kind() {
                    ErrorKind::Resource => MessageLevel::Warning,
                    _ => MessageLevel::Info,
                };
                log::info!("Smart crop: {}", e);
                show_message(level, "Smart Crop", &e.to_string());
            }
        }
    }

    fn save_crop(&self) {
        let Some(preview) = &self.crop_preview else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_title("Save Cropped Image")
            .add_filter("PNG Image", &["png"])
            .set_file_name("crop.png")
            .save_file()
        else {
            return;
        };

        match DynamicImage::ImageRgba8(preview.image.clone()).save(&path) {
            Ok(()) => log::info!("Saved crop to {:?}", path),
            Err(e) => {
                log::error!("Failed to save crop: {}", e);
                show_message(MessageLevel::Error, "Save Error", &e.to_string());
            }
        }
    }

    fn nail_coordinates_text(&self) -> String {
        self.session
            .store()
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. ({}, {})", i + 1, p.x, p.y))
            .collect::<Vec<String>>()
            .join("\n")
    }

    // Handle clicks on the workspace with the selected canvas tool
    fn handle_canvas_interactions(&mut self, response: egui::Response) {
        let view_rect = response.rect;

        let border_rect = self.canvas.get_screen_rect(view_rect);
        self.ui_state.cursor_position = response
            .hover_pos()
            .filter(|pos| border_rect.contains(*pos))
            .map(|pos| {
                let (cx, cy) = self.canvas.click_position(pos, view_rect);
                self.session.scale().to_image_space(cx, cy)
            });

        if !response.clicked() {
            return;
        }
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        let (x, y) = self.canvas.click_position(pos, view_rect);

        let result = match self.ui_state.selected_tool {
            Some(Tool::Nail) => self.session.place_nail(x, y).map(|_| ()),
            Some(Tool::Erase) => self.session.erase_nail(x, y).map(|_| ()),
            Some(Tool::Prioritize) => self.session.prioritize_nail(x, y).map(|_| ()),
            Some(_) | None => {
                log::debug!("Click at {:?} with no canvas tool selected", (x, y));
                return;
            }
        };

        match result {
            Ok(()) => self.path_overlay = None,
            Err(e) => {
                log::debug!("{:?} at {:?}: {}", e.kind(), (x, y), e);
                self.ui_state.status = e.to_string();
            }
        }
    }

    // Draw the background, the nails and the ordered path
    fn draw_canvas(&mut self, ui: &mut Ui) -> egui::Response {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
        let view_rect = response.rect;

        let bg_color = if self.ui_state.dark_mode {
            Color32::from_rgb(20, 20, 20)
        } else {
            Color32::from_rgb(240, 240, 240)
        };
        painter.rect_filled(view_rect, 0.0, bg_color);

        self.session.fit_to_canvas(view_rect.width());
        let (width, height) = self.session.displayed_size().unwrap_or((0.0, 0.0));
        self.canvas.set_size(width, height);
        let image_rect = self.canvas.get_screen_rect(view_rect);

        if let Some(texture) = &self.background_texture {
            painter.image(
                texture.texture_id(ui.ctx()),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        } else {
            painter.text(
                view_rect.center(),
                egui::Align2::CENTER_CENTER,
                "No background image",
                egui::FontId::default(),
                Color32::GRAY,
            );
        }

        let scale = self.session.scale();
        if self.ui_state.show_path {
            if let Some(path) = self.path_overlay.as_ref().filter(|p| !p.is_empty()) {
                let points: Vec<egui::Pos2> = path
                    .points
                    .iter()
                    .map(|&(x, y)| {
                        let (cx, cy) = scale.to_canvas_space(x, y);
                        self.canvas
                            .canvas_to_screen_pos(egui::pos2(cx as f32, cy as f32), view_rect)
                    })
                    .collect();
                if points.len() > 1 {
                    painter.add(egui::Shape::closed_line(
                        points,
                        Stroke::new(1.0, config::PATH_COLOR),
                    ));
                }
            }
        }

        for (x, y, priority) in self.session.canvas_nails() {
            let screen_pos = self
                .canvas
                .canvas_to_screen_pos(egui::pos2(x as f32, y as f32), view_rect);
            let color = if priority {
                config::PRIORITY_NAIL_COLOR
            } else {
                config::NAIL_COLOR
            };
            painter.circle_filled(screen_pos, config::NAIL_OUTLINE_RADIUS, config::NAIL_OUTLINE_COLOR);
            painter.circle_filled(screen_pos, config::NAIL_RADIUS, color);
        }

        if let Some(mouse_pos) = response.hover_pos() {
            if image_rect.contains(mouse_pos) {
                let crosshair_color = Color32::from_rgb(255, 0, 0);
                let crosshair_size = 8.0;

                painter.line_segment(
                    [
                        egui::pos2(mouse_pos.x - crosshair_size, mouse_pos.y),
                        egui::pos2(mouse_pos.x + crosshair_size, mouse_pos.y),
                    ],
                    Stroke::new(1.0, crosshair_color),
                );
                painter.line_segment(
                    [
                        egui::pos2(mouse_pos.x, mouse_pos.y - crosshair_size),
                        egui::pos2(mouse_pos.x, mouse_pos.y + crosshair_size),
                    ],
                    Stroke::new(1.0, crosshair_color),
                );

                if matches!(
                    self.ui_state.selected_tool,
                    Some(Tool::Erase) | Some(Tool::Prioritize)
                ) {
                    painter.circle_stroke(
                        mouse_pos,
                        config::SAFE_ZONE,
                        Stroke::new(1.0, Color32::from_rgb(0, 200, 0)),
                    );
                }
            }
        }

        response
    }

    fn draw_toolbar(&mut self, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            for tool in Tool::ALL {
                let selected = self.ui_state.selected_tool == Some(tool);
                let clicked = ui
                    .selectable_label(selected, tool.label())
                    .on_hover_text(tool.shortcut_text())
                    .clicked();
                if clicked {
                    self.run_tool(tool);
                }
            }
        });
    }

    fn draw_nail_panel(&mut self, ui: &mut Ui) {
        ui.heading("Nails");
        ui.label(format!("{} placed", self.session.store().len()));
        if let Some(bg) = self.session.background() {
            ui.label(format!(
                "Image: {}x{} (scale {:.2})",
                bg.width(),
                bg.height(),
                self.session.scale().factor()
            ));
        }

        if !self.session.store().is_empty() && ui.button("Copy All Coordinates").clicked() {
            let text = self.nail_coordinates_text();
            if !self.copy_to_clipboard(text) {
                log::warn!("Clipboard is not available");
            }
        }

        ui.separator();

        let mut to_remove: Option<usize> = None;
        let mut to_prioritize: Option<usize> = None;

        egui::ScrollArea::vertical()
            .max_height(300.0)
            .show(ui, |ui| {
                for (i, placement) in self.session.store().iter().enumerate() {
                    ui.horizontal(|ui| {
                        let marker = if placement.priority { "★" } else { " " };
                        ui.label(format!("{} {}. ({}, {})", marker, i + 1, placement.x, placement.y));
                        if !placement.priority && ui.small_button("Prioritize").clicked() {
                            to_prioritize = Some(i);
                        }
                        if ui.small_button("Delete").clicked() {
                            to_remove = Some(i);
                        }
                    });
                }
            });

        if let Some(index) = to_prioritize {
            if self.session.prioritize_nail_at(index) {
                if let Some(nail) = self.session.store().get(index) {
                    self.ui_state.status =
                        format!("Nail {} at ({}, {}) is the priority", index, nail.x, nail.y);
                }
            }
            self.path_overlay = None;
        }
        if let Some(index) = to_remove {
            self.session.erase_nail_at(index);
            self.path_overlay = None;
        }

        ui.separator();

        ui.collapsing("Appearance", |ui| {
            ui.checkbox(&mut self.ui_state.dark_mode, "Dark Mode");
            ui.checkbox(&mut self.ui_state.show_path, "Show Crop Path");
        });

        ui.collapsing("Help", |ui| {
            ui.label("• Background (B) picks the photo; it clears existing nails");
            ui.label("• Nail (N) places a nail where you click");
            ui.label("• Erase (E) removes the nail under the cursor");
            ui.label("• Prioritize (P) sets the green start nail");
            ui.label("• Export Positions (Ctrl+S) writes <image>.placements.json");
            ui.label("• Export Pattern (Ctrl+Shift+S) writes a .stringartpng");
            ui.label("• Import Positions (Ctrl+O) reads either file");
            ui.label("• Smart Crop (C) orders the nails and cuts out the shape");
        });
    }

    fn draw_crop_preview(&mut self, ctx: &Context) {
        let mut open = self.crop_preview.is_some();
        let mut save = false;

        if let Some(preview) = &self.crop_preview {
            egui::Window::new("Smart Crop")
                .open(&mut open)
                .resizable(true)
                .show(ctx, |ui| {
                    preview.texture.show_max_size(ui, egui::vec2(480.0, 480.0));
                    if ui.button("Save…").clicked() {
                        save = true;
                    }
                });
        }

        if save {
            self.save_crop();
        }
        if !open {
            self.crop_preview = None;
        }
    }
}

impl eframe::App for StringArtistApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut style = (*ctx.style()).clone();
        if self.ui_state.dark_mode {
            style.visuals = egui::Visuals::dark();
        } else {
            style.visuals = egui::Visuals::light();
        }
        ctx.set_style(style);

        if let Some(tool) = ctx.input(Tool::from_input) {
            self.run_tool(tool);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(config::WINDOW_TITLE);
                ui.separator();
                self.draw_toolbar(ui);
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.ui_state.status.as_str());
                if let Some((x, y)) = self.ui_state.cursor_position {
                    ui.separator();
                    ui.label(format!("({}, {})", x, y));
                }
            });
        });

        egui::SidePanel::right("nail_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_nail_panel(ui);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().inner_margin(config::WORKSPACE_PADDING))
            .show(ctx, |ui| {
                let response = self.draw_canvas(ui);
                self.handle_canvas_interactions(response);
            });

        self.draw_crop_preview(ctx);
    }
}
