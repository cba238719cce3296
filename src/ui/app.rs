//! Main application for the Omok GUI

use eframe::egui;
use egui::{CentralPanel, Context, CornerRadius, Frame, RichText, SidePanel, TopBottomPanel, Vec2};

use crate::board::Player;
use crate::config::{Difficulty, GameConfig};
use crate::error::SessionError;

use super::board_view::{BoardFrame, BoardView};
use super::game_state::{GameMode, GameState, Persistence};
use super::theme::*;

/// Main Omok application
pub struct OmokApp {
    state: GameState,
    board_view: BoardView,
    show_agent_card: bool,
}

impl OmokApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: GameConfig,
        persistence: Persistence,
    ) -> Result<Self, SessionError> {
        let mode = GameMode::PvE {
            human_color: config.default_ai_color.opponent(),
            level: config.default_level,
        };
        Ok(Self {
            state: GameState::new(mode, config, persistence)?,
            board_view: BoardView::default(),
            show_agent_card: true,
        })
    }

    fn render_menu_bar(&mut self, ctx: &Context) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    for level in Difficulty::ALL {
                        ui.menu_button(format!("vs {}", level.label()), |ui| {
                            for human_color in [Player::Black, Player::White] {
                                if ui.button(format!("Play {human_color}")).clicked() {
                                    self.state.restart(GameMode::PvE { human_color, level });
                                    ui.close_menu();
                                }
                            }
                        });
                    }
                    if ui.button("Hotseat").clicked() {
                        self.state.restart(GameMode::PvP);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Resign").clicked() {
                        self.state.resign();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_agent_card, "Agent panel (A)");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let mode_text = match self.state.mode {
                        GameMode::PvE { human_color, level } => {
                            format!("You: {human_color} vs {}", level.label())
                        }
                        GameMode::PvP => "Hotseat".to_string(),
                    };
                    ui.label(mode_text);
                });
            });
        });
    }

    fn render_side_panel(&mut self, ctx: &Context) {
        SidePanel::right("info_panel")
            .min_width(240.0)
            .max_width(280.0)
            .frame(Frame::new().fill(egui::Color32::from_rgb(25, 27, 31)))
            .show(ctx, |ui| {
                ui.add_space(12.0);
                self.render_title_card(ui);
                ui.add_space(12.0);

                self.render_turn_card(ui);
                ui.add_space(10.0);

                self.render_actions_card(ui);

                if self.show_agent_card && matches!(self.state.mode, GameMode::PvE { .. }) {
                    ui.add_space(10.0);
                    self.render_agent_card(ui);
                }

                if let Some(result) = self.state.result_text() {
                    ui.add_space(10.0);
                    self.render_game_over_card(ui, &result);
                }

                if let Some(msg) = &self.state.message {
                    ui.add_space(10.0);
                    Self::render_message_card(ui, msg);
                }
            });
    }

    fn card_frame() -> Frame {
        Frame::new()
            .fill(egui::Color32::from_rgb(35, 38, 43))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(12.0)
    }

    fn render_title_card(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(RichText::new("●○").size(20.0).color(egui::Color32::from_rgb(180, 180, 185)));
            ui.add_space(4.0);
            ui.label(RichText::new("OMOK").size(22.0).strong().color(TEXT_PRIMARY));
        });
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            let size = self.state.session.board().size();
            ui.label(RichText::new(format!("{size}×{size} · renju restrictions")).size(11.0).color(TEXT_MUTED));
        });
    }

    fn render_turn_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            let current = self.state.session.current();
            let (stone_char, accent, glyph_color) = match current {
                Player::Black => ("●", egui::Color32::from_rgb(70, 70, 75), TEXT_PRIMARY),
                Player::White => ("○", egui::Color32::from_rgb(220, 220, 225), egui::Color32::from_rgb(30, 30, 35)),
            };

            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(Vec2::new(48.0, 48.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 22.0, accent);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    stone_char,
                    egui::FontId::proportional(28.0),
                    glyph_color,
                );

                ui.add_space(12.0);

                ui.vertical(|ui| {
                    ui.add_space(4.0);
                    ui.label(RichText::new(current.to_string().to_uppercase()).size(18.0).strong().color(TEXT_PRIMARY));

                    let (status, color) = if self.state.is_game_over() {
                        ("Game over".to_string(), WIN_HIGHLIGHT)
                    } else if let Some(elapsed) = self.state.ai_thinking_elapsed() {
                        (format!("Agent thinking {:.1}s", elapsed.as_secs_f32()), STATUS_WARNING)
                    } else {
                        (format!("To move {:.0}s", self.state.turn_started.elapsed().as_secs_f32()), STATUS_OK)
                    };
                    ui.label(RichText::new(status).size(12.0).color(color));
                });
            });
        });
    }

    fn render_actions_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("ACTIONS").size(10.0).color(TEXT_MUTED));
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                let btn_frame = Frame::new()
                    .fill(egui::Color32::from_rgb(50, 53, 58))
                    .corner_radius(CornerRadius::same(6))
                    .inner_margin(8.0);

                btn_frame.show(ui, |ui| {
                    let label = egui::Label::new(RichText::new("Resign").size(12.0).color(TEXT_PRIMARY));
                    if ui.add(label.sense(egui::Sense::click())).clicked() {
                        self.state.resign();
                    }
                });

                ui.add_space(4.0);

                btn_frame.show(ui, |ui| {
                    let label = egui::Label::new(RichText::new("New game").size(12.0).color(TEXT_PRIMARY));
                    if ui.add(label.sense(egui::Sense::click())).clicked() {
                        self.state.restart(self.state.mode);
                    }
                });
            });

            ui.add_space(8.0);
            let moves = self.state.session.history().len();
            ui.label(RichText::new(format!("Move #{moves}")).size(11.0).color(TEXT_SECONDARY));
        });
    }

    fn render_agent_card(&self, ui: &mut egui::Ui) {
        Frame::new()
            .fill(egui::Color32::from_rgb(30, 33, 38))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new("AGENT").size(10.0).color(TEXT_MUTED));
                ui.add_space(6.0);

                let Some(turn) = self.state.last_agent_turn() else {
                    ui.label(RichText::new("No agent move yet").size(10.0).color(TEXT_MUTED));
                    return;
                };

                let policy = turn.info.as_ref().map_or("none", |info| info.policy.as_str());
                let (source, color) = if turn.fallback {
                    ("fallback", STATUS_ERROR)
                } else {
                    (policy, STATUS_OK)
                };
                ui.horizontal(|ui| {
                    ui.label(RichText::new(source).size(11.0).strong().color(color));
                    if let Some(elapsed) = self.state.last_agent_time {
                        ui.label(RichText::new(format!("{}ms", elapsed.as_millis())).size(10.0).color(TEXT_SECONDARY));
                    }
                });

                if let Some(info) = &turn.info {
                    let version = info.model_version.as_deref().unwrap_or("-");
                    ui.label(
                        RichText::new(format!("{} candidates · {version}", info.candidates))
                            .size(10.0)
                            .color(TEXT_MUTED),
                    );
                }

                let size = self.state.session.board().size();
                let column = (b'A' + turn.mv.x) as char;
                let row = size - turn.mv.y as usize;
                ui.add_space(4.0);
                ui.label(RichText::new(format!("→ {column}{row}")).size(12.0).strong().color(WIN_HIGHLIGHT));

                if let Some(reason) = &turn.discarded {
                    ui.label(RichText::new(reason).size(10.0).color(TEXT_SECONDARY));
                }
            });
    }

    fn render_game_over_card(&mut self, ui: &mut egui::Ui, result: &str) {
        Frame::new()
            .fill(egui::Color32::from_rgb(45, 80, 55))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("GAME OVER").size(12.0).color(egui::Color32::from_rgb(180, 255, 180)));
                    ui.add_space(8.0);
                    ui.label(RichText::new(result).size(16.0).strong().color(TEXT_PRIMARY));
                    ui.add_space(12.0);

                    Frame::new()
                        .fill(egui::Color32::from_rgb(60, 100, 70))
                        .corner_radius(CornerRadius::same(6))
                        .inner_margin(10.0)
                        .show(ui, |ui| {
                            let label = egui::Label::new(
                                RichText::new("New Game").size(14.0).strong().color(TEXT_PRIMARY),
                            );
                            if ui.add(label.sense(egui::Sense::click())).clicked() {
                                self.state.restart(self.state.mode);
                            }
                        });
                });
            });
    }

    fn render_message_card(ui: &mut egui::Ui, msg: &str) {
        Frame::new()
            .fill(egui::Color32::from_rgb(80, 60, 30))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("⚠").size(14.0));
                    ui.add_space(4.0);
                    ui.label(RichText::new(msg).size(11.0).color(TEXT_PRIMARY));
                });
            });
    }

    fn render_board(&mut self, ctx: &Context) {
        CentralPanel::default().show(ctx, |ui| {
            ui.style_mut().visuals.panel_fill = egui::Color32::from_rgb(40, 42, 46);

            let session = &self.state.session;
            let clicked = self.board_view.show(
                ui,
                BoardFrame {
                    board: session.board(),
                    to_move: session.current(),
                    last_move: session.last_move().map(|mv| mv.pos()),
                    winning_line: self.state.winning_line,
                    locked: session.is_finished() || session.is_agent_turn(),
                },
            );

            if let Some(pos) = clicked {
                if let Err(msg) = self.state.try_place_stone(pos) {
                    self.state.message = Some(msg);
                }
            }
        });
    }

    fn handle_input(&mut self, ctx: &Context) {
        ctx.input(|i| {
            // A - Toggle agent panel
            if i.key_pressed(egui::Key::A) {
                self.show_agent_card = !self.show_agent_card;
            }

            // N - New game, same mode
            if i.key_pressed(egui::Key::N) {
                self.state.restart(self.state.mode);
            }
        });
    }
}

impl eframe::App for OmokApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        self.state.check_ai_result();
        if self.state.is_ai_turn() && !self.state.is_ai_thinking() {
            self.state.start_ai_thinking();
        }

        self.render_menu_bar(ctx);
        self.render_side_panel(ctx);
        self.render_board(ctx);

        if self.state.is_ai_thinking() || !self.state.is_game_over() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
        if self.state.is_ai_thinking() {
            ctx.request_repaint();
        }
    }
}
