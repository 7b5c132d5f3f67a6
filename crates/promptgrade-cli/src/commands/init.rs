//! The `promptgrade init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("promptgrade.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("challenges")?;
    write_if_missing(Path::new("challenges/example.toml"), EXAMPLE_CHALLENGES)?;

    println!("\nNext steps:");
    println!("  1. Set PROMPTGRADE_GEMINI_KEY and enable [ai] in promptgrade.toml (optional)");
    println!("  2. Run: promptgrade validate --challenges challenges");
    println!(
        "  3. Run: promptgrade evaluate --challenges challenges --challenge-id rest-api --prompt \"...\""
    );

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# promptgrade configuration

# Max concurrent submissions in batch mode.
parallelism = 4

[ai]
# Without an API key the heuristic evaluator is always used.
enabled = false
provider = "gemini"
api_key = "${GEMINI_API_KEY}"
model = "gemini-1.5-flash"
timeout_secs = 30
temperature = 0.2
max_output_tokens = 1024
"#;

const EXAMPLE_CHALLENGES: &str = r#"[[challenges]]
id = "rest-api"
title = "Design a REST API"
category = "Backend"
difficulty = "Intermediate"
instruction = "Write a prompt that asks an assistant to design a REST API for user management."
tips = [
    "Define resources and HTTP methods",
    "Mention authentication method",
    "Specify pagination",
    "Describe error handling",
]
tags = ["api", "rest"]
example_prompt = """
Create a RESTful API for user management with the following endpoints:
GET /api/users - List all users with pagination support
POST /api/users - Create new user with validation
PUT /api/users/:id - Update user information
DELETE /api/users/:id - Remove user from system

Use JWT authentication for all endpoints.
Return consistent JSON responses with proper error handling.
"""

[[challenges]]
id = "landing-page"
title = "Landing page layout"
category = "UI/UX Design"
difficulty = "Beginner"
instruction = "Write a prompt for a responsive landing page for a mobile fitness app."
tips = [
    "Describe the target audience",
    "List the page sections",
    "Mention responsive breakpoints",
]
tags = ["ui", "responsive"]
"#;
