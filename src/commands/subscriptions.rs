// Subscriptions command - show what a schema generation listens to

use anyhow::Result;
use serde_json::json;

use crate::cli::args::SubscriptionsArgs;
use crate::config::Config;
use crate::dispatch::Dispatcher;

pub fn handle_subscriptions(args: &SubscriptionsArgs, config: &Config) -> Result<()> {
    let generation = args
        .schema
        .unwrap_or_else(|| config.formatter.effective_schema());
    let dispatcher = Dispatcher::new(generation);
    let steps_as_tests = generation.adapter().reports_steps_as_tests();
    let events: Vec<&str> = dispatcher.subscribed_events().collect();

    if args.is_json() {
        let report = json!({
            "schema": generation.to_string(),
            "steps_as_tests": steps_as_tests,
            "events": events,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Schema {} ({})",
            generation,
            if steps_as_tests {
                "steps reported as tests"
            } else {
                "steps reported as output"
            }
        );
        for event in events {
            println!("  {}", event);
        }
    }

    Ok(())
}
