//! Styling for priority tiers.

use store::Priority;

/// CSS class carrying a tier's colours.
pub fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::MustHave => "tier-must-have",
        Priority::GoodToHave => "tier-good-to-have",
        Priority::LongTermGoal => "tier-long-term-goal",
    }
}

/// The picker buttons of the item form: tier, label and class.
pub fn priority_options(selected: Priority) -> Vec<(Priority, &'static str, String)> {
    Priority::ALL
        .into_iter()
        .map(|priority| {
            let class = if priority == selected {
                format!("priority-option selected {}", priority_class(priority))
            } else {
                "priority-option".to_string()
            };
            (priority, priority.label(), class)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_selected_option_is_highlighted() {
        let options = priority_options(Priority::LongTermGoal);
        let labels: Vec<_> = options.iter().map(|(_, label, _)| *label).collect();
        assert_eq!(labels, ["Must Have!", "Good to Have", "Long-term Goal"]);
        assert_eq!(options[0].2, "priority-option");
        assert_eq!(options[2].2, "priority-option selected tier-long-term-goal");
    }
}
