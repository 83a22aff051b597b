use indexmap::IndexMap;
use minijinja::{context, Environment};
use serde::Serialize;

/// Role instructions sent ahead of every analysis request.
pub const SYSTEM_PROMPT: &str = "You are a cybersecurity assistant. You analyze real reconnaissance tool output \
and only report what is actually present in it.";

const ANALYSIS_TEMPLATE: &str = "\
You have been provided with real security scan results for the target: {{ target }}.
Analyze these results and provide structured, actionable insights.

Scan Results:
{% for finding in findings %}
{{ finding.description }}: {{ finding.output }}
{% endfor %}

Please summarize:
- Potential security vulnerabilities based on scan findings.
- Recommendations for securing the system.
- Any follow-up scans that may be needed.";

#[derive(Serialize)]
struct Finding<'a> {
    description: &'a str,
    output: &'a str,
}

/// Builds the analysis request for one pipeline run, one line per task in
/// task order.
pub fn analysis_prompt(target: &str, results: &IndexMap<String, String>) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);

    let findings: Vec<Finding<'_>> = results
        .iter()
        .map(|(description, output)| Finding { description, output })
        .collect();

    env.render_str(ANALYSIS_TEMPLATE, context! { target => target, findings => findings })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_findings_in_order() {
        let mut results = IndexMap::new();
        results.insert("Run nmap on example.com".to_string(), "22/tcp open ssh".to_string());
        results.insert("Run ffuf on https://example.com".to_string(), "admin [Status: 200]".to_string());

        let prompt = analysis_prompt("example.com", &results).unwrap();

        assert!(prompt.contains("for the target: example.com."));
        let nmap = prompt.find("Run nmap on example.com: 22/tcp open ssh").unwrap();
        let ffuf = prompt.find("Run ffuf on https://example.com: admin [Status: 200]").unwrap();
        assert!(nmap < ffuf);
        assert!(prompt.ends_with("Any follow-up scans that may be needed."));
    }

    #[test]
    fn test_tool_output_is_not_html_escaped() {
        let mut results = IndexMap::new();
        results.insert("Run ffuf on https://example.com".to_string(), "<script> & \"quotes\"".to_string());

        let prompt = analysis_prompt("example.com", &results).unwrap();
        assert!(prompt.contains("<script> & \"quotes\""));
    }
}
