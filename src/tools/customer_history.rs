//! Customer history lookup.

use super::base_tool::Tool;

/// Name the model uses to call the lookup.
pub const CUSTOMER_HISTORY_TOOL: &str = "check_customer_history";

/// Look up a customer's past interactions and tickets.
///
/// There is no ticketing backend yet, so every customer is reported as new.
pub fn check_customer_history(customer_name: &str) -> String {
    format!(
        "Checking history for {}... This is a new customer.",
        customer_name.trim()
    )
}

/// `check_customer_history` wrapped as an agent tool.
pub fn customer_history_tool() -> Tool {
    Tool::new(
        CUSTOMER_HISTORY_TOOL,
        "Check the customer's history of interactions and support tickets.",
        |input: &str| Ok(check_customer_history(input)),
    )
    .with_args_description(
        r#"{"customer_name": {"description": "Name of the customer", "type": "str"}}"#,
    )
}
