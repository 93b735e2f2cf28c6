//! Terminal front-end for the decision gateway: collects the two
//! options, runs the clarifying Q&A loop, prints the final report.

use std::io::{self, Write};

use anyhow::Result;

use crossroads::client::HttpGateway;
use crossroads::config::Config;
use crossroads::models::AssistantReply;
use crossroads::session::{Session, Submission};

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_question(reply: &AssistantReply) {
    println!("\n{}", reply.text);
    if let Some(options) = &reply.options {
        println!("  [{}]", options.join(" / "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let config = Config::load();
    let base_url = std::env::var("CROSSROADS_URL")
        .unwrap_or_else(|_| format!("http://{}", config.server.bind));

    let sentinel = config.trigger.sentinel.clone();
    let session = Session::new(HttpGateway::new(&base_url), config.trigger);

    println!("Two options, one decision. Let's narrow it down.");
    let first = loop {
        let opt1 = prompt("Option A: ")?;
        let opt2 = prompt("Option B: ")?;
        match session.begin(&opt1, &opt2).await {
            Ok(reply) => break reply,
            Err(e) => eprintln!("Could not start: {e}"),
        }
    };
    print_question(&first);

    let hint = sentinel
        .map(|s| format!("Type an answer, or '{s}' for the verdict: "))
        .unwrap_or_else(|| "Type an answer: ".to_string());

    loop {
        let input = prompt(&hint)?;
        match session.submit(&input).await {
            Ok(Submission::Question(reply)) => print_question(&reply),
            Ok(Submission::Report(report)) => {
                println!("\n--- Verdict ---\n{report}");
                break;
            }
            Ok(Submission::Ignored) => continue,
            // a lost round trip just means resubmitting; the session is untouched
            Err(e) => eprintln!("Request failed ({e}), try again."),
        }
    }

    Ok(())
}
