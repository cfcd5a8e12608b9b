//! Keyboard Input
//!
//! Turns key presses into [`UserAction`]s. Form contents, the focused field
//! and list cursors live here because the controller only sees a form once
//! it is submitted; everything else is read off [`AppState`].
//!
//! # Keys
//!
//! | Where            | Keys                                                    |
//! |------------------|---------------------------------------------------------|
//! | everywhere       | Ctrl+C quit, PgUp/PgDn back/next screen                 |
//! | prompt           | y/Enter accept, n/Esc decline                           |
//! | home             | l login, r register, q quit                             |
//! | forms            | Tab/arrows move, Enter submit, Esc back                 |
//! | session screens  | x logout                                                |
//! | food selection   | Tab slot, Up/Down pick, Space toggle, g generate        |
//! | weekly plan      | Left/Right day, Up/Down slot, Space eaten, / chat, ...  |
//! | reminders        | e enable, t test, a trigger all, k check, d/f/s doctor  |

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use planner_core::{
    AppState, DietPreference, HealthCondition, LoginForm, MealSlot, RegistrationForm, Screen,
    UserAction,
};

/// Longest doctor visit date accepted (`YYYY-MM-DD`)
const DATE_LEN: usize = 10;

/// What a key press amounted to
#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// Nothing to do
    Ignored,
    /// Local edit only (typing, cursor movement)
    Edited,
    /// Forward to the controller
    Action(UserAction),
    /// Act on the newest worker notification
    Notification(NotificationCommand),
}

/// Interaction with a notification in the worker panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationCommand {
    /// Click the notification body
    Open,
    /// Click "Mark as Consumed"
    MarkConsumed,
    /// Click "Remind Later"
    Snooze,
    /// Dismiss without clicking
    Dismiss,
}

/// Registration form fields, in tab order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterField {
    /// Name
    Name,
    /// Age
    Age,
    /// Weight
    Weight,
    /// Height
    Height,
    /// Health profile (choice)
    Health,
    /// Diet (choice)
    Diet,
    /// Password
    Password,
}

impl RegisterField {
    /// Every field in tab order
    pub const ALL: [RegisterField; 7] = [
        RegisterField::Name,
        RegisterField::Age,
        RegisterField::Weight,
        RegisterField::Height,
        RegisterField::Health,
        RegisterField::Diet,
        RegisterField::Password,
    ];

    /// Field label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Age => "Age",
            Self::Weight => "Weight (kg)",
            Self::Height => "Height (cm)",
            Self::Health => "Health condition",
            Self::Diet => "Diet preference",
            Self::Password => "Password",
        }
    }

    fn is_choice(&self) -> bool {
        matches!(self, Self::Health | Self::Diet)
    }

    fn is_number(&self) -> bool {
        matches!(self, Self::Age | Self::Weight | Self::Height)
    }
}

/// Everything typed but not yet submitted
#[derive(Debug, Default)]
pub struct InputState {
    login: LoginForm,
    login_focus: usize,
    registration: RegistrationForm,
    register_focus: usize,
    food_slot: Option<MealSlot>,
    food_cursor: usize,
    plan_slot: Option<MealSlot>,
    chat: String,
    chat_focused: bool,
    visit_date: String,
    date_focused: bool,
}

impl InputState {
    /// Empty forms, nothing focused
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Read access for rendering
    // ========================================================================

    /// Login form as typed
    pub fn login(&self) -> &LoginForm {
        &self.login
    }

    /// 0 for the name, 1 for the password
    pub fn login_focus(&self) -> usize {
        self.login_focus
    }

    /// Registration form as typed
    pub fn registration(&self) -> &RegistrationForm {
        &self.registration
    }

    /// Focused registration field
    pub fn register_field(&self) -> RegisterField {
        RegisterField::ALL[self.register_focus]
    }

    /// Slot shown on the food selection screen
    pub fn food_slot(&self) -> MealSlot {
        self.food_slot.unwrap_or(MealSlot::Morning)
    }

    /// Highlighted food in that slot
    pub fn food_cursor(&self) -> usize {
        self.food_cursor
    }

    /// Highlighted slot on the weekly plan
    pub fn plan_slot(&self) -> MealSlot {
        self.plan_slot.unwrap_or(MealSlot::Morning)
    }

    /// Chat message being typed
    pub fn chat_draft(&self) -> &str {
        &self.chat
    }

    /// Whether keys go to the chat box
    pub fn chat_focused(&self) -> bool {
        self.chat_focused
    }

    /// Visit date being typed
    pub fn visit_date(&self) -> &str {
        &self.visit_date
    }

    /// Whether keys go to the visit date
    pub fn date_focused(&self) -> bool {
        self.date_focused
    }

    // ========================================================================
    // Screen changes
    // ========================================================================

    /// Reset what belongs to the screen just entered
    pub fn on_screen(&mut self, screen: Screen) {
        match screen {
            Screen::Login => {
                self.login = LoginForm::default();
                self.login_focus = 0;
            }
            Screen::Register => {
                self.registration = RegistrationForm::default();
                self.register_focus = 0;
            }
            Screen::FoodSelection => {
                self.food_slot = None;
                self.food_cursor = 0;
            }
            Screen::WeeklyPlan => {
                self.plan_slot = None;
                self.chat_focused = false;
            }
            Screen::SmartReminders => {
                self.date_focused = false;
            }
            Screen::Home
            | Screen::Dashboard
            | Screen::WeeklyProgress
            | Screen::HealthDashboard => {}
        }
    }

    // ========================================================================
    // Keys
    // ========================================================================

    /// Handle one key press against the current state
    pub fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Action(UserAction::Quit);
        }

        if state.pending_confirmation().is_some() {
            return match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                    KeyOutcome::Action(UserAction::ConfirmationAnswered { accepted: true })
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    KeyOutcome::Action(UserAction::ConfirmationAnswered { accepted: false })
                }
                _ => KeyOutcome::Ignored,
            };
        }

        match key.code {
            KeyCode::PageUp => return KeyOutcome::Action(UserAction::NavigateBack),
            KeyCode::PageDown => return KeyOutcome::Action(UserAction::NavigateNext),
            _ => {}
        }

        match state.screen() {
            Screen::Home => Self::home_key(key),
            Screen::Login => self.login_key(key),
            Screen::Register => self.register_key(key),
            Screen::Dashboard => Self::dashboard_key(key),
            Screen::FoodSelection => self.food_key(key, state),
            Screen::WeeklyPlan => self.plan_key(key, state),
            Screen::SmartReminders => self.reminders_key(key, state),
            Screen::WeeklyProgress => match key.code {
                KeyCode::Char('h') => KeyOutcome::Action(UserAction::OpenHealthDashboard),
                KeyCode::Char('b') => KeyOutcome::Action(UserAction::BackToPlan),
                KeyCode::Char('x') => KeyOutcome::Action(UserAction::Logout),
                _ => KeyOutcome::Ignored,
            },
            Screen::HealthDashboard => match key.code {
                KeyCode::Char('b') => KeyOutcome::Action(UserAction::BackToDashboard),
                KeyCode::Char('x') => KeyOutcome::Action(UserAction::Logout),
                _ => KeyOutcome::Ignored,
            },
        }
    }

    fn home_key(key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Char('l') => KeyOutcome::Action(UserAction::ChooseLogin),
            KeyCode::Char('r') => KeyOutcome::Action(UserAction::ChooseRegister),
            KeyCode::Char('q') | KeyCode::Esc => KeyOutcome::Action(UserAction::Quit),
            _ => KeyOutcome::Ignored,
        }
    }

    fn login_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('r') => KeyOutcome::Action(UserAction::ChooseRegister),
                _ => KeyOutcome::Ignored,
            };
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login_focus = 1 - self.login_focus;
                KeyOutcome::Edited
            }
            KeyCode::Enter => KeyOutcome::Action(UserAction::SubmitLogin(self.login.clone())),
            KeyCode::Esc => KeyOutcome::Action(UserAction::NavigateBack),
            KeyCode::Backspace => {
                self.login_text().pop();
                KeyOutcome::Edited
            }
            KeyCode::Char(c) => {
                self.login_text().push(c);
                KeyOutcome::Edited
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn login_text(&mut self) -> &mut String {
        if self.login_focus == 0 {
            &mut self.login.name
        } else {
            &mut self.login.password
        }
    }

    fn register_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('l') => KeyOutcome::Action(UserAction::ChooseLogin),
                _ => KeyOutcome::Ignored,
            };
        }

        let count = RegisterField::ALL.len();
        let field = self.register_field();

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.register_focus = (self.register_focus + 1) % count;
                KeyOutcome::Edited
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.register_focus = (self.register_focus + count - 1) % count;
                KeyOutcome::Edited
            }
            KeyCode::Enter => {
                KeyOutcome::Action(UserAction::SubmitRegistration(self.registration.clone()))
            }
            KeyCode::Esc => KeyOutcome::Action(UserAction::NavigateBack),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if field.is_choice() => {
                self.cycle_choice(field, key.code != KeyCode::Left);
                KeyOutcome::Edited
            }
            KeyCode::Backspace => {
                if let Some(text) = self.register_text(field) {
                    text.pop();
                }
                KeyOutcome::Edited
            }
            KeyCode::Char(c) => {
                if field.is_number() && !(c.is_ascii_digit() || c == '.') {
                    return KeyOutcome::Ignored;
                }
                match self.register_text(field) {
                    Some(text) => {
                        text.push(c);
                        KeyOutcome::Edited
                    }
                    None => KeyOutcome::Ignored,
                }
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn register_text(&mut self, field: RegisterField) -> Option<&mut String> {
        let form = &mut self.registration;
        match field {
            RegisterField::Name => Some(&mut form.name),
            RegisterField::Age => Some(&mut form.age),
            RegisterField::Weight => Some(&mut form.weight),
            RegisterField::Height => Some(&mut form.height),
            RegisterField::Password => Some(&mut form.password),
            RegisterField::Health | RegisterField::Diet => None,
        }
    }

    fn cycle_choice(&mut self, field: RegisterField, forward: bool) {
        let form = &mut self.registration;
        match field {
            RegisterField::Health => {
                let all = HealthCondition::ALL;
                let next = match form.health_conditions {
                    None if forward => 0,
                    None => all.len() - 1,
                    Some(current) => {
                        let at = all.iter().position(|c| *c == current).unwrap_or(0);
                        if forward {
                            (at + 1) % all.len()
                        } else {
                            (at + all.len() - 1) % all.len()
                        }
                    }
                };
                form.health_conditions = Some(all[next]);
            }
            RegisterField::Diet => {
                form.diet_preference = Some(match form.diet_preference {
                    Some(DietPreference::Veg) => DietPreference::NonVeg,
                    Some(DietPreference::NonVeg) | None => DietPreference::Veg,
                });
            }
            _ => {}
        }
    }

    fn dashboard_key(key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Char('c') => KeyOutcome::Action(UserAction::StartPlanning),
            KeyCode::Char('r') => KeyOutcome::Action(UserAction::OpenReminders),
            KeyCode::Char('x') => KeyOutcome::Action(UserAction::Logout),
            _ => KeyOutcome::Ignored,
        }
    }

    fn food_key(&mut self, key: KeyEvent, state: &AppState) -> KeyOutcome {
        let slot = self.food_slot();
        let foods = state.available_foods().for_slot(slot);

        match key.code {
            KeyCode::Tab | KeyCode::Right => {
                self.food_slot = Some(step_slot(slot, true));
                self.food_cursor = 0;
                KeyOutcome::Edited
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.food_slot = Some(step_slot(slot, false));
                self.food_cursor = 0;
                KeyOutcome::Edited
            }
            KeyCode::Up => {
                self.food_cursor = self.food_cursor.saturating_sub(1);
                KeyOutcome::Edited
            }
            KeyCode::Down => {
                if self.food_cursor + 1 < foods.len() {
                    self.food_cursor += 1;
                }
                KeyOutcome::Edited
            }
            KeyCode::Char(' ') | KeyCode::Enter => match foods.get(self.food_cursor) {
                Some(food) => KeyOutcome::Action(UserAction::ToggleFood {
                    slot,
                    food: food.clone(),
                }),
                None => KeyOutcome::Ignored,
            },
            KeyCode::Char('g') => KeyOutcome::Action(UserAction::GeneratePlan),
            KeyCode::Char('x') => KeyOutcome::Action(UserAction::Logout),
            _ => KeyOutcome::Ignored,
        }
    }

    fn plan_key(&mut self, key: KeyEvent, state: &AppState) -> KeyOutcome {
        if self.chat_focused {
            return match key.code {
                KeyCode::Esc => {
                    self.chat_focused = false;
                    KeyOutcome::Edited
                }
                KeyCode::Enter => {
                    if self.chat.trim().is_empty() || state.chat_loading() {
                        return KeyOutcome::Ignored;
                    }
                    KeyOutcome::Action(UserAction::SendChat(std::mem::take(&mut self.chat)))
                }
                KeyCode::Backspace => {
                    self.chat.pop();
                    KeyOutcome::Edited
                }
                KeyCode::Char(c) => {
                    self.chat.push(c);
                    KeyOutcome::Edited
                }
                _ => KeyOutcome::Ignored,
            };
        }

        let day = state.current_day();
        match key.code {
            KeyCode::Left | KeyCode::BackTab => {
                KeyOutcome::Action(UserAction::SelectDay(day.previous()))
            }
            KeyCode::Right | KeyCode::Tab => KeyOutcome::Action(UserAction::SelectDay(day.next())),
            KeyCode::Up => {
                self.plan_slot = Some(step_slot(self.plan_slot(), false));
                KeyOutcome::Edited
            }
            KeyCode::Down => {
                self.plan_slot = Some(step_slot(self.plan_slot(), true));
                KeyOutcome::Edited
            }
            KeyCode::Char(' ') | KeyCode::Enter if state.meal_plan().is_some() => {
                KeyOutcome::Action(UserAction::MarkConsumed {
                    day,
                    slot: self.plan_slot(),
                })
            }
            KeyCode::Char('/' | 'i') => {
                self.chat_focused = true;
                KeyOutcome::Edited
            }
            KeyCode::Char('r') => KeyOutcome::Action(UserAction::RegeneratePlan),
            KeyCode::Char('v') => KeyOutcome::Action(UserAction::ViewProgress),
            KeyCode::Char('f') if state.meal_plan().is_none() => {
                KeyOutcome::Action(UserAction::ChooseFoods)
            }
            KeyCode::Char('x') => KeyOutcome::Action(UserAction::Logout),
            _ => KeyOutcome::Ignored,
        }
    }

    fn reminders_key(&mut self, key: KeyEvent, state: &AppState) -> KeyOutcome {
        let form = state.doctor_form();

        if self.date_focused {
            return match key.code {
                KeyCode::Esc => {
                    self.date_focused = false;
                    KeyOutcome::Edited
                }
                KeyCode::Enter => {
                    self.date_focused = false;
                    let date = self.visit_date.trim();
                    KeyOutcome::Action(UserAction::UpdateDoctorForm {
                        last_visit_date: (!date.is_empty()).then(|| date.to_string()),
                        frequency: form.frequency,
                    })
                }
                KeyCode::Backspace => {
                    self.visit_date.pop();
                    KeyOutcome::Edited
                }
                KeyCode::Char(c)
                    if (c.is_ascii_digit() || c == '-') && self.visit_date.len() < DATE_LEN =>
                {
                    self.visit_date.push(c);
                    KeyOutcome::Edited
                }
                _ => KeyOutcome::Ignored,
            };
        }

        match key.code {
            KeyCode::Char('e') => KeyOutcome::Action(UserAction::EnableReminders),
            KeyCode::Char('t') => KeyOutcome::Action(UserAction::TestPush),
            KeyCode::Char('a') => KeyOutcome::Action(UserAction::TriggerAllReminders),
            KeyCode::Char('k') => KeyOutcome::Action(UserAction::CheckReminders),
            KeyCode::Char('d') => {
                self.visit_date = form.last_visit_date.clone().unwrap_or_default();
                self.date_focused = true;
                KeyOutcome::Edited
            }
            KeyCode::Char('f') => KeyOutcome::Action(UserAction::UpdateDoctorForm {
                last_visit_date: form.last_visit_date.clone(),
                frequency: form.frequency.cycle(),
            }),
            KeyCode::Char('s') => KeyOutcome::Action(UserAction::SetupDoctorReminder),
            KeyCode::Char('o') => KeyOutcome::Notification(NotificationCommand::Open),
            KeyCode::Char('m') => KeyOutcome::Notification(NotificationCommand::MarkConsumed),
            KeyCode::Char('z') => KeyOutcome::Notification(NotificationCommand::Snooze),
            KeyCode::Char('w') => KeyOutcome::Notification(NotificationCommand::Dismiss),
            KeyCode::Char('x') => KeyOutcome::Action(UserAction::Logout),
            _ => KeyOutcome::Ignored,
        }
    }
}

fn step_slot(slot: MealSlot, forward: bool) -> MealSlot {
    let all = MealSlot::ALL;
    let at = all.iter().position(|s| *s == slot).unwrap_or(0);
    if forward {
        all[(at + 1) % all.len()]
    } else {
        all[(at + all.len() - 1) % all.len()]
    }
}
