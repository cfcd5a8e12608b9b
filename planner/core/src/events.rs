//! User Actions
//!
//! Everything a UI surface can ask the controller to do. Surfaces translate
//! their own input (keys, clicks, taps) into these and never touch state
//! directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    CheckupFrequency, DietPreference, FoodRecord, HealthCondition, MealSlot, Weekday,
};
use crate::gateway::{LoginRequest, RegisterRequest};

/// Actions from UI surface to controller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UserAction {
    // ============================================
    // Navigation
    // ============================================
    /// "Register" on home, or the link on the login form
    ChooseRegister,
    /// "Login" on home, or the link on the registration form
    ChooseLogin,
    /// Left arrow
    NavigateBack,
    /// Right arrow
    NavigateNext,
    /// Dashboard shortcut to smart reminders
    OpenReminders,
    /// Weekly plan shortcut to progress
    ViewProgress,
    /// Progress shortcut to the health dashboard
    OpenHealthDashboard,
    /// Progress shortcut back to the plan
    BackToPlan,
    /// Health dashboard shortcut back to the dashboard
    BackToDashboard,
    /// Weekly plan without a plan: go pick foods
    ChooseFoods,

    // ============================================
    // Session
    // ============================================
    /// Submit the login form
    SubmitLogin(LoginForm),
    /// Submit the registration form
    SubmitRegistration(RegistrationForm),
    /// End the session
    Logout,

    // ============================================
    // Planning
    // ============================================
    /// "Create meal plan" on the dashboard
    StartPlanning,
    /// "Regenerate" on the weekly plan
    RegeneratePlan,
    /// Answer to a pending confirmation prompt
    ConfirmationAnswered {
        /// Whether the user said yes
        accepted: bool,
    },
    /// Select or deselect a food for a slot
    ToggleFood {
        /// Slot
        slot: MealSlot,
        /// Food, identified by name
        food: FoodRecord,
    },
    /// Send selections to the backend for a plan
    GeneratePlan,
    /// Switch the weekly plan's day tab
    SelectDay(Weekday),
    /// Toggle consumption of a slot on a plan day
    MarkConsumed {
        /// Plan day
        day: Weekday,
        /// Slot
        slot: MealSlot,
    },

    // ============================================
    // Chat
    // ============================================
    /// Ask the plan assistant something
    SendChat(String),

    // ============================================
    // Reminders
    // ============================================
    /// Run the push registration flow
    EnableReminders,
    /// Ask the backend for a test push
    TestPush,
    /// Fire every reminder now
    TriggerAllReminders,
    /// Run the reminder check now
    CheckReminders,
    /// Edit the doctor checkup form
    UpdateDoctorForm {
        /// Last checkup, `YYYY-MM-DD`
        last_visit_date: Option<String>,
        /// Checkup frequency
        frequency: CheckupFrequency,
    },
    /// Submit the doctor checkup form
    SetupDoctorReminder,

    // ============================================
    // Lifecycle
    // ============================================
    /// The user wants to exit
    Quit,
}

/// Validation failures detected before any request is sent
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormError {
    /// A required field is blank
    #[error("Please fill in all required fields")]
    MissingFields,

    /// Login name or password blank
    #[error("Please enter your name and password")]
    MissingCredentials,

    /// Age, weight or height is not a positive number
    #[error("Please enter valid numbers for age, weight and height")]
    InvalidNumber,
}

/// Login form contents
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    /// User name
    pub name: String,
    /// Password
    pub password: String,
}

impl LoginForm {
    /// Create a filled-in form
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }

    /// Check the form and build the request
    ///
    /// # Errors
    ///
    /// [`FormError::MissingCredentials`] when either field is blank.
    pub fn validate(&self) -> Result<LoginRequest, FormError> {
        let name = self.name.trim();
        if name.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        Ok(LoginRequest {
            name: name.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Registration form contents, as typed
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationForm {
    /// User name
    pub name: String,
    /// Age in years, as typed
    pub age: String,
    /// Weight in kg, as typed
    pub weight: String,
    /// Height in cm, as typed
    pub height: String,
    /// Chosen health profile
    pub health_conditions: Option<HealthCondition>,
    /// Chosen diet
    pub diet_preference: Option<DietPreference>,
    /// Password
    pub password: String,
}

impl RegistrationForm {
    /// Check every field and build the request
    ///
    /// # Errors
    ///
    /// [`FormError::MissingFields`] if anything is blank or unchosen,
    /// [`FormError::InvalidNumber`] if a measurement does not parse.
    pub fn validate(&self) -> Result<RegisterRequest, FormError> {
        let name = self.name.trim();
        let blank = [name, self.age.trim(), self.weight.trim(), self.height.trim()]
            .iter()
            .any(|field| field.is_empty())
            || self.password.is_empty();

        let (Some(health_conditions), Some(diet_preference)) =
            (self.health_conditions, self.diet_preference)
        else {
            return Err(FormError::MissingFields);
        };
        if blank {
            return Err(FormError::MissingFields);
        }

        let age: u32 = self
            .age
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidNumber)?;
        let weight = parse_positive(&self.weight)?;
        let height = parse_positive(&self.height)?;
        if age == 0 {
            return Err(FormError::InvalidNumber);
        }

        Ok(RegisterRequest {
            name: name.to_string(),
            age,
            weight,
            height,
            health_conditions,
            diet_preference,
            password: self.password.clone(),
        })
    }
}

// Passwords stay out of logs
impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("name", &self.name)
            .field("age", &self.age)
            .field("weight", &self.weight)
            .field("height", &self.height)
            .field("health_conditions", &self.health_conditions)
            .field("diet_preference", &self.diet_preference)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn parse_positive(value: &str) -> Result<f64, FormError> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => Ok(n),
        _ => Err(FormError::InvalidNumber),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete_form() -> RegistrationForm {
        RegistrationForm {
            name: "Asha".to_string(),
            age: "34".to_string(),
            weight: "62.5".to_string(),
            height: "160".to_string(),
            health_conditions: Some(HealthCondition::Diabetes),
            diet_preference: Some(DietPreference::Veg),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_complete_registration_validates() {
        let request = complete_form().validate().unwrap();
        assert_eq!(request.age, 34);
        assert!((request.weight - 62.5).abs() < f64::EPSILON);
        assert_eq!(request.health_conditions, HealthCondition::Diabetes);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["health_conditions"], "diabetes");
        assert_eq!(json["diet_preference"], "veg");
    }

    #[test]
    fn test_each_missing_field_is_rejected() {
        let blanks: [fn(&mut RegistrationForm); 7] = [
            |f| f.name = "  ".to_string(),
            |f| f.age.clear(),
            |f| f.weight.clear(),
            |f| f.height.clear(),
            |f| f.health_conditions = None,
            |f| f.diet_preference = None,
            |f| f.password.clear(),
        ];
        for blank in blanks {
            let mut form = complete_form();
            blank(&mut form);
            assert_eq!(form.validate(), Err(FormError::MissingFields));
        }
    }

    #[test]
    fn test_non_numeric_measurements_are_rejected() {
        let mut form = complete_form();
        form.height = "tall".to_string();
        assert_eq!(form.validate(), Err(FormError::InvalidNumber));

        let mut form = complete_form();
        form.weight = "-4".to_string();
        assert_eq!(form.validate(), Err(FormError::InvalidNumber));
    }

    #[test]
    fn test_missing_fields_message() {
        assert_eq!(
            FormError::MissingFields.to_string(),
            "Please fill in all required fields"
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", LoginForm::new("asha", "hunter2"));
        assert!(!rendered.contains("hunter2"));
        assert!(!format!("{:?}", complete_form()).contains("secret"));
    }

    #[test]
    fn test_login_form_trims_name() {
        let request = LoginForm::new(" asha ", "pw").validate().unwrap();
        assert_eq!(request.name, "asha");
        assert_eq!(
            LoginForm::new("asha", "").validate().unwrap_err(),
            FormError::MissingCredentials
        );
    }
}
