use dialoguer::Confirm;
use dispatch_core::models::BlastRadius;
use dispatch_core::series::{AutoConfirm, ConfirmationPort};

/// Asks on the terminal before a cascading delete goes ahead.
pub struct DialoguerConfirmation;

impl ConfirmationPort for DialoguerConfirmation {
    fn confirm(&self, radius: &BlastRadius) -> bool {
        Confirm::new()
            .with_prompt(format!(
                "Delete {} trip(s) from series '{}'?",
                radius.affected(),
                radius.job_number
            ))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

pub fn confirmation(skip_prompt: bool) -> Box<dyn ConfirmationPort> {
    if skip_prompt {
        Box::new(AutoConfirm)
    } else {
        Box::new(DialoguerConfirmation)
    }
}
