//! Topic-scope gate: is a query about programming or IT at all?
//!
//! Matching is deliberately loose (case-insensitive substring), so any
//! query mentioning a listed term passes.

use once_cell::sync::Lazy;
use regex::Regex;

/// Code-like fragments: keywords, arrows, semicolons, call syntax
static CODE_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\bfunction\b|\bclass\b|=>|\{\}|;|const\s+|let\s+|def\s+|print\(|for\s*\(|while\s*\(|if\s*\(|try\s*\{?)",
    )
    .expect("static pattern")
});

const PROGRAMMING_TERMS: &[&str] = &[
    "program", "code", "coding", "developer", "debug", "bug", "algorithm", "data structure",
    "variable", "variables", "var", "let", "const",
    "loop", "loops", "for", "while", "foreach",
    "function", "functions", "method", "return", "parameter", "argument",
    "array", "arrays", "list", "lists", "index",
    "object", "objects", "dictionary", "json", "key", "value",
    "class", "classes", "constructor", "inheritance", "oop",
    "conditional", "conditionals", "if", "else", "elif",
    "error", "errors", "exception", "exceptions", "try", "catch", "finally",
    "javascript", "python", "js", "py",
];

const IT_TERMS: &[&str] = &[
    // web and APIs
    "html", "css", "javascript", "js", "frontend", "backend", "api", "rest", "json", "xml",
    "http", "https", "cookie", "session", "cors",
    // databases
    "database", "databases", "sql", "nosql", "mysql", "postgres", "sqlite", "mongodb", "query",
    "index", "transaction", "schema",
    // networking
    "network", "networking", "tcp", "udp", "tcp/ip", "ip", "ipv4", "ipv6", "dns", "dhcp", "nat",
    "subnet", "gateway", "router", "switch", "firewall", "vpn", "ssl", "tls", "ssh", "ftp",
    "smtp", "http/2",
    // operating systems
    "linux", "ubuntu", "debian", "windows", "macos", "kernel", "process", "thread",
    "filesystem", "bash", "powershell", "cmd",
    // cloud and devops
    "cloud", "aws", "azure", "gcp", "iam", "s3", "ec2", "lambda", "cloudfront", "vpc", "eks",
    "aks", "gke", "docker", "kubernetes", "k8s", "container", "compose", "helm", "terraform",
    "ansible", "cicd", "ci/cd", "pipeline",
    // security
    "security", "cybersecurity", "xss", "csrf", "sql injection", "hash", "encryption", "aes",
    "rsa", "jwt", "oauth", "oidc", "sso", "pentest",
    // version control
    "git", "github", "gitlab", "bitbucket", "branch", "merge", "rebase", "commit", "tag",
    "version", "semver",
    // hardware
    "cpu", "gpu", "ram", "ssd", "nvme", "raid", "virtualization", "hypervisor", "vm", "vmware",
    "virtualbox",
    // general
    "it support", "helpdesk", "service desk", "ticket", "sla", "monitoring", "logging",
    "observability", "prometheus", "grafana", "elk", "splunk",
];

fn looks_like_code(query: &str) -> bool {
    CODE_LIKE.is_match(query)
}

fn mentions_any(query: &str, terms: &[&str]) -> bool {
    let lower = query.to_lowercase();
    terms.iter().any(|term| lower.contains(term))
}

/// Query contains code or a programming term
pub fn is_programming_query(query: &str) -> bool {
    if query.trim().is_empty() {
        return false;
    }
    looks_like_code(query) || mentions_any(query, PROGRAMMING_TERMS)
}

/// Query is about programming or the wider IT field
pub fn is_it_query(query: &str) -> bool {
    if query.trim().is_empty() {
        return false;
    }
    is_programming_query(query) || mentions_any(query, IT_TERMS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_programming_terms() {
        assert!(is_programming_query("What is a for loop?"));
        assert!(is_programming_query("Explain ARRAYS"));
        assert!(!is_programming_query("best pizza toppings"));
    }

    #[test]
    fn test_code_like_input() {
        assert!(is_programming_query("x => x * 2"));
        assert!(is_programming_query("def greet(name):"));
        assert!(is_programming_query("while (true) {}"));
    }

    #[test]
    fn test_it_terms() {
        assert!(is_it_query("How does DNS resolution work?"));
        assert!(is_it_query("kubernetes pods"));
        assert!(!is_programming_query("kubernetes pods"));
    }

    #[test]
    fn test_off_topic() {
        assert!(!is_it_query("What's the weather like"));
        assert!(!is_it_query("Tell me a joke"));
    }

    #[test]
    fn test_blank_input() {
        assert!(!is_it_query(""));
        assert!(!is_programming_query("   "));
    }
}
