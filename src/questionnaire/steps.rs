//! Static questionnaire definition: ten steps and their fields

use serde_json::{Map, Value};

/// Typed visibility predicate: show the field only when `field` equals `equals`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub field: &'static str,
    pub equals: &'static str,
}

impl Condition {
    pub const fn new(field: &'static str, equals: &'static str) -> Self {
        Self { field, equals }
    }

    pub fn evaluate(&self, answers: &Map<String, Value>) -> bool {
        answers
            .get(self.field)
            .and_then(Value::as_str)
            .is_some_and(|value| value == self.equals)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Free numeric input; unparsable input falls back to `min`, values clamp to `min`
    Number { min: f64 },
    /// Bounded numeric input
    Slider { min: f64, max: f64, step: f64 },
    /// Exactly one of the options
    Choice { options: &'static [&'static str] },
    /// Any subset of the options
    MultiChoice { options: &'static [&'static str] },
    /// List of financial goals
    Goals,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub visible_when: Option<Condition>,
}

impl FieldDefinition {
    const fn new(id: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            id,
            label,
            kind,
            visible_when: None,
        }
    }

    const fn when(mut self, condition: Condition) -> Self {
        self.visible_when = Some(condition);
        self
    }

    pub fn is_visible(&self, answers: &Map<String, Value>) -> bool {
        self.visible_when
            .map_or(true, |condition| condition.evaluate(answers))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldDefinition],
}

const YES_NO: &[&str] = &["Yes", "No"];

const fn money(id: &'static str, label: &'static str) -> FieldDefinition {
    FieldDefinition::new(id, label, FieldKind::Number { min: 0.0 })
}

const fn choice(
    id: &'static str,
    label: &'static str,
    options: &'static [&'static str],
) -> FieldDefinition {
    FieldDefinition::new(id, label, FieldKind::Choice { options })
}

const fn slider(id: &'static str, label: &'static str, min: f64, max: f64) -> FieldDefinition {
    FieldDefinition::new(
        id,
        label,
        FieldKind::Slider {
            min,
            max,
            step: 1.0,
        },
    )
}

pub static STEPS: &[StepDefinition] = &[
    StepDefinition {
        id: "income",
        title: "Salary & Income",
        fields: &[
            money("monthly_income", "Monthly take-home income"),
            choice("side_income", "Do you have a side income?", YES_NO),
            money("side_income_amount", "Side income per month")
                .when(Condition::new("side_income", "Yes")),
            choice("bonus_pay", "Do you receive bonuses?", &["Yes", "No", "Sometimes"]),
        ],
    },
    StepDefinition {
        id: "housing",
        title: "Living Situation & Rent",
        fields: &[
            choice(
                "housing_status",
                "Housing situation",
                &["Rent", "Own", "Living with family"],
            ),
            money("housing_expenses", "Rent or mortgage per month"),
            money("utility_bills", "Utility bills per month"),
            FieldDefinition::new("household_size", "People in household", FieldKind::Number { min: 1.0 }),
        ],
    },
    StepDefinition {
        id: "food",
        title: "Food & Dining",
        fields: &[
            money("groceries_weekly", "Groceries per week"),
            money("dining_monthly", "Dining out per month"),
            choice(
                "food_ordering",
                "How often do you order food?",
                &["Daily", "Few times a week", "Rarely"],
            ),
        ],
    },
    StepDefinition {
        id: "shopping",
        title: "Shopping Habits",
        fields: &[
            money("shopping_monthly", "Shopping per month"),
            slider("impulse_shopping", "Impulse shopping (1-5)", 1.0, 5.0),
            choice(
                "online_shopping",
                "Online shopping frequency",
                &["Daily", "Weekly", "Monthly", "Rarely"],
            ),
        ],
    },
    StepDefinition {
        id: "subscriptions",
        title: "Subscriptions & Entertainment",
        fields: &[
            FieldDefinition::new(
                "subscriptions",
                "Active subscriptions",
                FieldKind::MultiChoice {
                    options: &["Netflix", "Prime Video", "Spotify", "YouTube Premium", "Gym", "Other"],
                },
            ),
            money("subscription_cost", "Subscriptions per month"),
            money("entertainment_hours", "Entertainment hours per month"),
        ],
    },
    StepDefinition {
        id: "transport",
        title: "Travel & Transportation",
        fields: &[
            money("commute_cost", "Daily commute cost"),
            choice(
                "transport_mode",
                "Main mode of transport",
                &["Public Transport", "Own Vehicle", "Both"],
            ),
            money("transport_monthly", "Transport per month"),
        ],
    },
    StepDefinition {
        id: "debt",
        title: "Debt & Loans",
        fields: &[
            choice("has_loans", "Do you have loans?", YES_NO),
            money("loan_repayment", "Loan repayment per month")
                .when(Condition::new("has_loans", "Yes")),
            choice(
                "loan_type",
                "Loan type",
                &["Education", "Car", "Home", "Personal", "Credit Card"],
            )
            .when(Condition::new("has_loans", "Yes")),
        ],
    },
    StepDefinition {
        id: "investments",
        title: "Investments & Financial Goals",
        fields: &[
            FieldDefinition::new(
                "investment_types",
                "Where do you invest?",
                FieldKind::MultiChoice {
                    options: &["Stocks", "Mutual Funds", "Fixed Deposits", "Gold", "Crypto", "None"],
                },
            ),
            money("monthly_investment", "Invested per month"),
            FieldDefinition::new("financial_goals", "Your financial goals", FieldKind::Goals),
        ],
    },
    StepDefinition {
        id: "behavior",
        title: "Budgeting Behavior & Mindset",
        fields: &[
            choice("track_spending", "Do you track your spending?", YES_NO),
            slider("impulse_control", "Impulse control (1-5)", 1.0, 5.0),
            slider("saving_behavior", "Saving consistency (1-10)", 1.0, 10.0),
            choice("risk_taking", "Risk appetite", &["Low", "Medium", "High"]),
        ],
    },
    StepDefinition {
        id: "commitment",
        title: "Commitment & Willingness",
        fields: &[
            slider("expense_reduction", "Willingness to cut expenses (1-10)", 1.0, 10.0),
            money("preferred_savings", "Target savings per month"),
            slider("financial_discipline", "Financial discipline (1-5)", 1.0, 5.0),
        ],
    },
];

/// Look up a field definition across all steps
pub fn find_field(id: &str) -> Option<&'static FieldDefinition> {
    STEPS
        .iter()
        .flat_map(|step| step.fields.iter())
        .find(|field| field.id == id)
}
