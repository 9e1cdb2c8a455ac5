use serde::{Deserialize, Serialize};

/// Generated Mermaid flowchart and a standalone page rendering it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flowchart {
    pub mermaid: String,
    pub html: String,
}

/// Sample process descriptions offered to users
pub const EXAMPLE_PROCESSES: &[(&str, &str)] = &[
    (
        "Simple Process",
        "User logs into system, system validates credentials, if valid show dashboard, if invalid show error message.",
    ),
    (
        "Business Process",
        "Customer places order, system checks inventory, if available process payment, if payment successful send confirmation email and ship product, if payment fails notify customer.",
    ),
    (
        "Decision Tree",
        "Employee requests time off, manager reviews request, if approved update calendar and notify employee, if denied send rejection reason to employee.",
    ),
];
