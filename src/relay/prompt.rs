/// Wrap the source text in the fixed security-review instruction.
///
/// The reply is expected to carry `SUMMARY:`, `IMPACT:` and `SOLUTION:`
/// sections whose numbered items line up by position.
pub fn build_prompt(source_text: &str) -> String {
    format!(
        "Analyze this code for security vulnerabilities (OWASP Top 10, SANS 25, business logic).
Provide a clear, concise report with these sections:

SUMMARY:
- List vulnerabilities found (name only)

IMPACT:
- For each vulnerability, briefly explain what risk it poses (1-2 sentences)

SOLUTION:
- For each, give a simple, practical fix or prevention tip with an example if applicable

Format as:

SUMMARY:
1. [Vuln Name]
2. [Vuln Name]

IMPACT:
1. [Explanation]

SOLUTION:
1. [Fix]

Keep the entire response concise and easy to scan.

Code to analyze:
```
{source_text}
```"
    )
}
