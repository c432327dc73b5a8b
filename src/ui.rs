//! Menus, HUD text and full-screen overlays
//!
//! Nothing here touches the DOM. The adapter asks for strings, colors and
//! alphas and puts them on screen however it likes.

use crate::consts::MAX_LIVES;
use crate::platform::Key;
use crate::renderer::{Color, palette};
use crate::sim::state::DEATH_TEXT_TICKS;
use crate::sim::{GameState, Phase, SaveSnapshot, VictoryStage};

pub const MENU_SELECTED: Color = Color::rgb(0xffffff);
pub const MENU_UNSELECTED: Color = Color::rgb(0x808080);
/// Dim layer behind the pause menu
pub const PAUSE_OVERLAY_ALPHA: f32 = 0.5;

pub const VICTORY_TEXT: &str = "VICTORY!";

/// One rendered menu line
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub label: &'static str,
    /// Secondary line under the label (save summary)
    pub detail: Option<String>,
    pub selected: bool,
    pub enabled: bool,
}

impl MenuItem {
    pub fn color(&self) -> Color {
        if self.selected {
            MENU_SELECTED
        } else {
            MENU_UNSELECTED
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleChoice {
    /// Fresh run at level 1, clears the save
    Start,
    Continue,
}

/// START / CONTINUE
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMenu {
    selected: usize,
    save_summary: Option<String>,
}

impl TitleMenu {
    pub fn new(save: Option<&SaveSnapshot>) -> Self {
        Self {
            selected: 0,
            save_summary: save.map(|s| {
                format!(
                    "Level {} - {}m",
                    s.current_level,
                    s.current_distance.floor() as u64
                )
            }),
        }
    }

    pub fn has_save(&self) -> bool {
        self.save_summary.is_some()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn items(&self) -> [MenuItem; 2] {
        [
            MenuItem {
                label: "START",
                detail: None,
                selected: self.selected == 0,
                enabled: true,
            },
            MenuItem {
                label: "CONTINUE",
                detail: self.save_summary.clone(),
                selected: self.selected == 1,
                enabled: self.has_save(),
            },
        ]
    }

    /// Returns the choice once Enter is pressed
    pub fn handle_key(&mut self, key: Key) -> Option<TitleChoice> {
        match key {
            Key::Up => self.selected = 0,
            Key::Down if self.has_save() => self.selected = 1,
            Key::Confirm => {
                return Some(if self.selected == 1 {
                    TitleChoice::Continue
                } else {
                    TitleChoice::Start
                });
            }
            _ => {}
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseChoice {
    Resume,
    /// Back to the title screen
    Exit,
}

/// CONTINUE / EXIT
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseMenu {
    selected: usize,
}

impl PauseMenu {
    /// Selection starts on CONTINUE every time the menu opens
    pub fn open(&mut self) {
        self.selected = 0;
    }

    pub fn items(&self) -> [MenuItem; 2] {
        [
            MenuItem {
                label: "CONTINUE",
                detail: None,
                selected: self.selected == 0,
                enabled: true,
            },
            MenuItem {
                label: "EXIT",
                detail: None,
                selected: self.selected == 1,
                enabled: true,
            },
        ]
    }

    pub fn handle_key(&mut self, key: Key) -> Option<PauseChoice> {
        match key {
            Key::Up => self.selected = 0,
            Key::Down => self.selected = 1,
            Key::Pause => return Some(PauseChoice::Resume),
            Key::Confirm => {
                return Some(if self.selected == 1 {
                    PauseChoice::Exit
                } else {
                    PauseChoice::Resume
                });
            }
            _ => {}
        }
        None
    }
}

/// HUD contents for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub distance: String,
    /// Hidden until a record exists
    pub record: Option<String>,
    pub level: String,
    /// One entry per life marker, `true` = remaining
    pub lives: [bool; MAX_LIVES as usize],
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let p = &state.progression;
        let mut lives = [false; MAX_LIVES as usize];
        for (i, life) in lives.iter_mut().enumerate() {
            *life = i < p.current_lives as usize;
        }

        Self {
            distance: format!("Distance: {}m", p.current_distance.floor() as u64),
            record: (p.record_distance > 0.0)
                .then(|| format!("Record: {}m", p.record_distance.floor() as u64)),
            level: format!(
                "Level: {} ({}m to go)",
                p.current_level,
                p.checkpoint_distance()
            ),
            lives,
        }
    }

    pub fn life_color(filled: bool) -> Color {
        if filled {
            palette::LIFE_FULL
        } else {
            palette::LIFE_EMPTY
        }
    }
}

pub fn death_message(final_life: bool) -> &'static str {
    if final_life { "IT'S OVER" } else { "YOU DIED!" }
}

/// Centered text over the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Banner {
    pub text: &'static str,
    pub color: Color,
    pub scale: f32,
    /// Glow copies drawn behind the text, scaled `1 + 0.1 * i`
    pub glow_layers: u32,
}

/// Everything drawn on top of the scene
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Overlay {
    pub banner: Option<Banner>,
    /// Black full-screen fade, 0 = clear
    pub fade_alpha: f32,
}

impl Overlay {
    pub fn from_state(state: &GameState, glow_layers: u32) -> Self {
        match state.phase {
            Phase::Alive => Self::default(),
            Phase::Dying {
                elapsed_ticks,
                final_life,
            } => Self {
                banner: (elapsed_ticks < DEATH_TEXT_TICKS).then(|| Banner {
                    text: death_message(final_life),
                    color: if final_life {
                        palette::GAME_OVER_TEXT
                    } else {
                        palette::DEATH_TEXT
                    },
                    scale: 1.0,
                    glow_layers: 0,
                }),
                fade_alpha: 0.0,
            },
            Phase::LevelTransitioning { elapsed_ticks } => {
                Self::victory(VictoryStage::at(elapsed_ticks), glow_layers)
            }
        }
    }

    fn victory(stage: VictoryStage, glow_layers: u32) -> Self {
        let banner = |alpha: f32, scale: f32| {
            Some(Banner {
                text: VICTORY_TEXT,
                color: palette::VICTORY.with_alpha(alpha),
                scale,
                glow_layers,
            })
        };

        match stage {
            // 0.8 -> 1.1 -> 1.0 while fading in
            VictoryStage::FadeIn(t) => {
                let scale = if t < 0.5 {
                    crate::lerp(0.8, 1.1, t * 2.0)
                } else {
                    crate::lerp(1.1, 1.0, (t - 0.5) * 2.0)
                };
                Self {
                    banner: banner(t, scale),
                    fade_alpha: 0.0,
                }
            }
            VictoryStage::Pulse { progress, .. } => Self {
                banner: banner(1.0, 1.0 + 0.1 * (1.0 - (progress * 2.0 - 1.0).abs())),
                fade_alpha: 0.0,
            },
            VictoryStage::FadeToBlack(t) => Self {
                banner: banner(1.0, 1.0),
                fade_alpha: t,
            },
            VictoryStage::FadeFromBlack(t) => Self {
                banner: None,
                fade_alpha: 1.0 - t,
            },
        }
    }
}
