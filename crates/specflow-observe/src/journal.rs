//! Journal view: the event log, oldest first.

use serde_json::json;

use specflow_core::format_timestamp;
use specflow_lifecycle::Spec;

use crate::error::ObserveError;
use crate::view::{RenderContext, View, ViewKind, ViewOutput};

pub struct JournalView;

impl View for JournalView {
    fn kind(&self) -> ViewKind {
        ViewKind::Journal
    }

    fn render(&self, spec: &Spec, _ctx: &RenderContext<'_>) -> Result<ViewOutput, ObserveError> {
        let journal = spec.journal();
        let mut text = String::new();

        text.push_str(&format!("=== Journal ({} events) ===\n\n", journal.len()));
        for event in journal.events() {
            let actor = event
                .actor
                .as_ref()
                .map(|a| a.display_name.as_str())
                .unwrap_or("system");
            text.push_str(&format!(
                "  {:>4}  {}  {:<16}  {}\n",
                event.sequence,
                format_timestamp(&event.timestamp),
                actor,
                event.kind
            ));
        }
        text.push('\n');

        let data = json!({
            "view": "journal",
            "events": serde_json::to_value(journal)?,
        });
        Ok(ViewOutput { text, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use specflow_core::{ActorRef, ManualClock};
    use specflow_lifecycle::{SpecLifecycle, Stage};

    #[test]
    fn events_in_order_with_actor() {
        let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
        let bob = ActorRef::new("u2", "Bob Smith");
        let mut engine = SpecLifecycle::create("spec-001", "Auth", clock, Some(bob));
        engine.change_stage(Stage::TechnicalDesign).unwrap();

        let output = JournalView.render(engine.spec(), &RenderContext::empty()).unwrap();
        assert!(output.text.contains("3 events"));
        assert!(output.text.contains("1  2024-01-15T09:00:00Z  Bob Smith"));
        assert!(output.text.contains("stage requirements -> technical-design"));
        assert!(output.text.contains("locked: Requirements locked because spec moved to"));
        assert_eq!(output.data["events"][0]["event"], "created");
        assert_eq!(output.data["events"][1]["sequence"], 2);
        assert_eq!(output.data["events"][2]["actor"]["displayName"], "Bob Smith");
    }
}
