//! Domain Types
//!
//! The records the diet planner backend hands us and the client-side
//! collections built from them. Everything here is plain data: no I/O, no
//! timers. Wire names follow the backend's JSON (`morning`, `Sunday`,
//! `isUserSelected`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned user identifier
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated user for this client session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend user id
    pub id: UserId,
    /// Name the user logged in with
    pub name: String,
}

impl Session {
    /// Create a session
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One of the three daily eating occasions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    /// Breakfast
    Morning,
    /// Lunch
    Afternoon,
    /// Dinner
    Dinner,
}

impl MealSlot {
    /// All slots in serving order
    pub const ALL: [MealSlot; 3] = [MealSlot::Morning, MealSlot::Afternoon, MealSlot::Dinner];

    /// Backend key for this slot
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Dinner => "dinner",
        }
    }

    /// Label shown to the user
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "Breakfast",
            Self::Afternoon => "Lunch",
            Self::Dinner => "Dinner",
        }
    }

    /// Parse a backend key or a display label (`breakfast`, `lunch`, ...)
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "morning" | "breakfast" => Some(Self::Morning),
            "afternoon" | "lunch" => Some(Self::Afternoon),
            "dinner" => Some(Self::Dinner),
            _ => None,
        }
    }
}

/// Day of the week, Sunday first (the backend's week layout)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    /// Sunday
    Sunday,
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
}

impl Weekday {
    /// All days, Sunday first
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Full day name as used in plan keys
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }

    /// Three-letter abbreviation
    #[must_use]
    pub fn short(&self) -> &'static str {
        &self.name()[..3]
    }

    /// Days since Sunday (0..=6)
    #[must_use]
    pub fn days_from_sunday(&self) -> u32 {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }

    /// Next day, wrapping Saturday to Sunday
    #[must_use]
    pub fn next(&self) -> Self {
        Self::ALL[(self.days_from_sunday() as usize + 1) % 7]
    }

    /// Previous day, wrapping Sunday to Saturday
    #[must_use]
    pub fn previous(&self) -> Self {
        Self::ALL[(self.days_from_sunday() as usize + 6) % 7]
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_sunday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_veg_type() -> String {
    "veg".to_string()
}

/// A candidate food offered for a meal slot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    /// Food name; identity within a slot
    pub food: String,
    /// Calories
    #[serde(default)]
    pub calories: f64,
    /// Protein
    #[serde(default)]
    pub protein: f64,
    /// Carbs
    #[serde(default)]
    pub carbs: f64,
    /// Fat
    #[serde(default)]
    pub fat: f64,
    /// `veg` or `non-veg`
    #[serde(default = "default_veg_type")]
    pub veg_type: String,
}

impl FoodRecord {
    /// Whether the food is non-vegetarian
    #[must_use]
    pub fn is_non_veg(&self) -> bool {
        self.veg_type == "non-veg"
    }
}

/// A meal assigned to a day and slot in the weekly plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    /// Food
    pub food: String,
    /// Calories
    #[serde(default)]
    pub calories: f64,
    /// Protein
    #[serde(default)]
    pub protein: f64,
    /// Fat
    #[serde(default)]
    pub fat: f64,
    /// Carbs
    #[serde(default)]
    pub carbs: f64,
    /// `veg` or `non-veg`
    #[serde(default = "default_veg_type")]
    pub veg_type: String,
    /// Picked by the user rather than recommended by the backend
    #[serde(rename = "isUserSelected", default)]
    pub is_user_selected: bool,
}

/// Foods the user picked, per slot, in pick order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedFoods(BTreeMap<MealSlot, Vec<FoodRecord>>);

impl SelectedFoods {
    /// Empty selection with every slot present
    #[must_use]
    pub fn new() -> Self {
        Self(MealSlot::ALL.iter().map(|slot| (*slot, Vec::new())).collect())
    }

    /// Add the food if absent, remove it if present (matched by name)
    ///
    /// Returns whether the food is selected afterwards.
    pub fn toggle(&mut self, slot: MealSlot, food: FoodRecord) -> bool {
        let foods = self.0.entry(slot).or_default();
        if let Some(pos) = foods.iter().position(|f| f.food == food.food) {
            foods.remove(pos);
            false
        } else {
            foods.push(food);
            true
        }
    }

    /// Whether a food (by name) is selected for the slot
    #[must_use]
    pub fn contains(&self, slot: MealSlot, food: &str) -> bool {
        self.0
            .get(&slot)
            .is_some_and(|foods| foods.iter().any(|f| f.food == food))
    }

    /// Selected foods for a slot
    #[must_use]
    pub fn for_slot(&self, slot: MealSlot) -> &[FoodRecord] {
        self.0.get(&slot).map_or(&[], Vec::as_slice)
    }

    /// Total number of selected foods
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// True when nothing is selected in any slot
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Candidate foods per slot for the current user's health profile
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailableFoods(BTreeMap<MealSlot, Vec<FoodRecord>>);

impl AvailableFoods {
    /// Build from per-slot lists
    #[must_use]
    pub fn from_slots(slots: BTreeMap<MealSlot, Vec<FoodRecord>>) -> Self {
        Self(slots)
    }

    /// Candidates for a slot
    #[must_use]
    pub fn for_slot(&self, slot: MealSlot) -> &[FoodRecord] {
        self.0.get(&slot).map_or(&[], Vec::as_slice)
    }

    /// True when no slot has candidates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

/// Meals for one day, per slot
pub type DayMeals = BTreeMap<MealSlot, Vec<MealRecord>>;

/// Seven-day by three-slot meal assignment
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyMealPlan(BTreeMap<Weekday, DayMeals>);

impl WeeklyMealPlan {
    /// Build from per-day meals
    #[must_use]
    pub fn from_days(days: BTreeMap<Weekday, DayMeals>) -> Self {
        Self(days)
    }

    /// Meals for a day (empty map when the plan has no entry)
    #[must_use]
    pub fn day(&self, day: Weekday) -> Option<&DayMeals> {
        self.0.get(&day)
    }

    /// Meals for a day and slot
    #[must_use]
    pub fn meals(&self, day: Weekday, slot: MealSlot) -> &[MealRecord] {
        self.0
            .get(&day)
            .and_then(|meals| meals.get(&slot))
            .map_or(&[], Vec::as_slice)
    }

    /// Display totals for a day's meals
    #[must_use]
    pub fn day_totals(&self, day: Weekday) -> MealTotals {
        self.0
            .get(&day)
            .into_iter()
            .flat_map(|meals| meals.values().flatten())
            .fold(MealTotals::default(), |mut acc, meal| {
                acc.calories += meal.calories;
                acc.protein += meal.protein;
                acc.carbs += meal.carbs;
                acc.fat += meal.fat;
                acc
            })
    }
}

/// Summed display values for a set of meals
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MealTotals {
    /// Calories
    pub calories: f64,
    /// Protein
    pub protein: f64,
    /// Carbs
    pub carbs: f64,
    /// Fat
    pub fat: f64,
}

/// Per-date, per-slot consumed flags
///
/// Slot keys go through [`MealSlot::parse`]; keys naming no slot are skipped
/// so one odd entry does not fail the whole refresh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumptionStatus(
    #[serde(deserialize_with = "lenient_slot_flags")] BTreeMap<String, BTreeMap<MealSlot, bool>>,
);

fn lenient_slot_flags<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, BTreeMap<MealSlot, bool>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, BTreeMap<String, bool>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(date, slots)| {
            let slots = slots
                .into_iter()
                .filter_map(|(key, consumed)| match MealSlot::parse(&key) {
                    Some(slot) => Some((slot, consumed)),
                    None => {
                        tracing::debug!(%date, %key, "Skipping unknown meal slot");
                        None
                    }
                })
                .collect();
            (date, slots)
        })
        .collect())
}

impl ConsumptionStatus {
    /// Build from raw per-date maps
    #[must_use]
    pub fn from_dates(dates: BTreeMap<String, BTreeMap<MealSlot, bool>>) -> Self {
        Self(dates)
    }

    /// Whether the slot on `date` (`YYYY-MM-DD`) is marked consumed
    #[must_use]
    pub fn is_consumed(&self, date: &str, slot: MealSlot) -> bool {
        self.0
            .get(date)
            .and_then(|slots| slots.get(&slot))
            .copied()
            .unwrap_or(false)
    }

    /// True when nothing has been consumed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Completion record for one calendar date
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCompletionRecord {
    /// All three slots consumed
    pub is_complete: bool,
    /// Distinct slots consumed
    #[serde(default)]
    pub consumed_meals: u32,
    /// Individual foods logged
    #[serde(default)]
    pub total_foods: u32,
}

/// Per-date completion records
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayCompletion(BTreeMap<String, DayCompletionRecord>);

impl DayCompletion {
    /// Build from raw per-date records
    #[must_use]
    pub fn from_dates(dates: BTreeMap<String, DayCompletionRecord>) -> Self {
        Self(dates)
    }

    /// Record for a date, if any consumption was logged
    #[must_use]
    pub fn get(&self, date: &str) -> Option<&DayCompletionRecord> {
        self.0.get(date)
    }

    /// Whether `date` is complete
    #[must_use]
    pub fn is_complete(&self, date: &str) -> bool {
        self.0.get(date).is_some_and(|r| r.is_complete)
    }
}

/// One day's row in the weekly dashboard
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyBreakdown {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Meals consumed
    pub meals_consumed: u32,
    /// Total meals
    pub total_meals: u32,
    /// Calories
    pub calories: f64,
    /// Is complete
    pub is_complete: bool,
}

/// Weekly consumption aggregate shown next to the plan
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyDashboard {
    /// Total calories consumed
    pub total_calories_consumed: f64,
    /// Total meals consumed
    pub total_meals_consumed: u32,
    /// Total possible meals
    pub total_possible_meals: u32,
    /// Daily breakdown
    pub daily_breakdown: BTreeMap<Weekday, DailyBreakdown>,
    /// Percent of possible meals consumed
    pub goal_percentage: f64,
    /// Target calories
    pub target_calories: f64,
    /// Calorie percentage
    pub calorie_percentage: f64,
}

/// One bar of the progress chart
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartPoint {
    /// Short day label (`Sun`, `Mon`, ...)
    pub day: String,
    /// Meals consumed
    pub meals_consumed: u32,
    /// Completion percentage
    pub completion_percentage: f64,
}

/// Weekly section of the health dashboard
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyHealth {
    /// Meal completion percentage
    pub meal_completion_percentage: f64,
    /// Total calories
    pub total_calories: f64,
    /// Total planned calories
    pub total_planned_calories: f64,
    /// Meals consumed
    pub meals_consumed: u32,
    /// Total possible meals
    pub total_possible_meals: u32,
    /// Chart data
    pub chart_data: Vec<ChartPoint>,
}

/// Health dashboard aggregate
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthDashboard {
    /// Weekly
    pub weekly: WeeklyHealth,
}

/// Health profile the backend filters foods by
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthCondition {
    /// No condition
    Normal,
    /// Diabetes
    Diabetes,
    /// High blood pressure
    Bp,
    /// Obesity
    Obesity,
    /// Heart disease
    Heart,
}

impl HealthCondition {
    /// All choices in menu order
    pub const ALL: [HealthCondition; 5] = [
        HealthCondition::Normal,
        HealthCondition::Diabetes,
        HealthCondition::Bp,
        HealthCondition::Obesity,
        HealthCondition::Heart,
    ];

    /// Label shown to the user
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Diabetes => "Diabetes",
            Self::Bp => "Blood Pressure",
            Self::Obesity => "Obesity",
            Self::Heart => "Heart Disease",
        }
    }
}

/// Dietary preference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietPreference {
    /// Vegetarian
    #[serde(rename = "veg")]
    Veg,
    /// Non-vegetarian
    #[serde(rename = "non-veg")]
    NonVeg,
}

impl DietPreference {
    /// Label shown to the user
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Veg => "Vegetarian",
            Self::NonVeg => "Non-Vegetarian",
        }
    }
}

/// How often the user sees a doctor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckupFrequency {
    /// Weekly
    Weekly,
    /// Monthly
    #[default]
    Monthly,
    /// Quarterly
    Quarterly,
    /// Yearly
    Yearly,
}

impl CheckupFrequency {
    /// All choices in menu order
    pub const ALL: [CheckupFrequency; 4] = [
        CheckupFrequency::Weekly,
        CheckupFrequency::Monthly,
        CheckupFrequency::Quarterly,
        CheckupFrequency::Yearly,
    ];

    /// Backend key
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Next choice, wrapping
    #[must_use]
    pub fn cycle(&self) -> Self {
        match self {
            Self::Weekly => Self::Monthly,
            Self::Monthly => Self::Quarterly,
            Self::Quarterly => Self::Yearly,
            Self::Yearly => Self::Weekly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_consumption_skips_unknown_slots() {
        let status: ConsumptionStatus = serde_json::from_value(serde_json::json!({
            "2024-03-04": { "morning": true, "snack": true, "Lunch": true },
            "2024-03-05": { "dinner": false }
        }))
        .unwrap();

        assert!(status.is_consumed("2024-03-04", MealSlot::Morning));
        assert!(status.is_consumed("2024-03-04", MealSlot::Afternoon));
        assert!(!status.is_consumed("2024-03-04", MealSlot::Dinner));
        assert!(!status.is_consumed("2024-03-05", MealSlot::Dinner));
    }

    fn food(name: &str) -> FoodRecord {
        FoodRecord {
            food: name.to_string(),
            calories: 120.0,
            protein: 4.0,
            carbs: 20.0,
            fat: 2.0,
            veg_type: "veg".to_string(),
        }
    }

    #[test]
    fn test_toggle_even_times_restores_membership() {
        let mut selected = SelectedFoods::new();
        selected.toggle(MealSlot::Morning, food("Poha"));
        let before = selected.clone();

        for _ in 0..4 {
            selected.toggle(MealSlot::Morning, food("Idli"));
        }
        assert_eq!(selected, before);

        assert!(!selected.toggle(MealSlot::Morning, food("Poha")));
        assert!(!selected.contains(MealSlot::Morning, "Poha"));
    }

    #[test]
    fn test_toggle_matches_by_name_only() {
        let mut selected = SelectedFoods::new();
        selected.toggle(MealSlot::Dinner, food("Dal"));

        let mut heavier = food("Dal");
        heavier.calories = 999.0;
        assert!(!selected.toggle(MealSlot::Dinner, heavier));
        assert!(selected.is_empty());
    }

    #[test]
    fn test_selected_foods_serializes_by_slot_key() {
        let mut selected = SelectedFoods::new();
        selected.toggle(MealSlot::Afternoon, food("Rice"));

        let json = serde_json::to_value(&selected).unwrap();
        assert_eq!(json["afternoon"][0]["food"], "Rice");
        assert_eq!(json["morning"], serde_json::json!([]));
    }

    #[test]
    fn test_plan_parses_backend_shape() {
        let plan: WeeklyMealPlan = serde_json::from_value(serde_json::json!({
            "Sunday": {
                "morning": [{"food": "Oats", "calories": 150.0, "protein": 5.0,
                             "fat": 3.0, "carbs": 27.0, "veg_type": "veg",
                             "isUserSelected": true}],
                "dinner": [{"food": "Chicken curry", "calories": 300,
                            "protein": 25, "fat": 12, "carbs": 8,
                            "veg_type": "non-veg", "isUserSelected": false}]
            }
        }))
        .unwrap();

        let breakfast = plan.meals(Weekday::Sunday, MealSlot::Morning);
        assert_eq!(breakfast.len(), 1);
        assert!(breakfast[0].is_user_selected);
        assert!(plan.meals(Weekday::Monday, MealSlot::Morning).is_empty());

        let totals = plan.day_totals(Weekday::Sunday);
        assert!((totals.calories - 450.0).abs() < f64::EPSILON);
        assert!((totals.protein - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_consumption_lookup_defaults_to_false() {
        let status: ConsumptionStatus = serde_json::from_value(serde_json::json!({
            "2024-03-03": {"morning": true}
        }))
        .unwrap();

        assert!(status.is_consumed("2024-03-03", MealSlot::Morning));
        assert!(!status.is_consumed("2024-03-03", MealSlot::Dinner));
        assert!(!status.is_consumed("2024-03-04", MealSlot::Morning));
    }

    #[test]
    fn test_weekday_navigation_wraps() {
        assert_eq!(Weekday::Saturday.next(), Weekday::Sunday);
        assert_eq!(Weekday::Sunday.previous(), Weekday::Saturday);
        assert_eq!(Weekday::from(chrono::Weekday::Wed), Weekday::Wednesday);
        assert_eq!(Weekday::Thursday.short(), "Thu");
    }

    #[test]
    fn test_meal_slot_parse_accepts_labels() {
        assert_eq!(MealSlot::parse("breakfast"), Some(MealSlot::Morning));
        assert_eq!(MealSlot::parse("Lunch"), Some(MealSlot::Afternoon));
        assert_eq!(MealSlot::parse("afternoon"), Some(MealSlot::Afternoon));
        assert_eq!(MealSlot::parse("brunch"), None);
    }
}
