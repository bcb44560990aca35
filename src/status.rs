// Configuration status display: shows what `generate` would run with.

use colored::Colorize;

use crate::config::Config;

/// Display the effective configuration to the terminal. Secrets are redacted.
pub fn show(config: &Config) {
    println!("{}", "=== titler configuration ===".bold());
    println!("Endpoint:        {}", config.base_url);
    println!("API key:         {}", config.redacted_api_key());
    println!("Model:           {}", config.persona.options.model);
    println!("Temperature:     {:.2}", config.persona.options.temperature);
    println!("Max concurrency: {}", config.max_concurrency);
    println!("Request timeout: {}s", config.request_timeout.as_secs());
    println!("Run timeout:     {}", describe_seconds(config.run_timeout.map(|d| d.as_secs())));
    println!(
        "Pacing:          {}",
        config
            .requests_per_second
            .map(|rps| format!("{rps} requests/s"))
            .unwrap_or_else(|| "unpaced".to_string())
    );
    println!(
        "System prompt:   {}",
        crate::output::truncate_chars(&config.persona.system_prompt, 70).dimmed()
    );

    if let Err(e) = config.require_api_key() {
        println!("\n{} {}", "Warning:".yellow(), e);
    }
}

fn describe_seconds(secs: Option<u64>) -> String {
    match secs {
        Some(s) => format!("{s}s"),
        None => "none".to_string(),
    }
}
