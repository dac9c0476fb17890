//! The fixed demonstration grammar and the textual report built from it.

use super::*;

/// A left-recursive grammar for a subset of the compiled language.
pub fn grammar() -> Grammar {
    Grammar::new("S")
        .terminals(["+", "-", "*", "/", "(", ")", "id", ";", "int", "=", "print"])
        .production("S", &[&["ST"]])
        .production(
            "ST",
            &[
                &["int", "id", ";"],
                &["id", "=", "E", ";"],
                &["print", "(", "E", ")", ";"],
                &["ST", "ST"],
            ],
        )
        .production("E", &[&["E", "+", "T"], &["E", "-", "T"], &["T"]])
        .production("T", &[&["T", "*", "F"], &["T", "/", "F"], &["F"]])
        .production("F", &[&["(", "E", ")"], &["id"]])
}

/// Renders the original grammar, its FIRST and FOLLOW sets, and the grammar after left
/// recursion elimination and then left factoring.
pub fn report() -> String {
    let original = grammar();
    let first = first_sets(&original);
    let follow = follow_sets(&original, &first);
    let without_recursion = eliminate_left_recursion(&original);
    let factored = left_factor(&without_recursion);

    let mut out = String::new();
    write_grammar(&mut out, "Original Grammar", &original);

    out.push_str("\nFIRST sets:\n");
    for (symbol, set) in &first {
        if original.is_nonterminal(symbol) {
            write_set(&mut out, "FIRST", symbol, set);
        }
    }

    out.push_str("\nFOLLOW sets:\n");
    for (symbol, set) in &follow {
        write_set(&mut out, "FOLLOW", symbol, set);
    }

    write_grammar(&mut out, "After Left Recursion Elimination", &without_recursion);
    write_grammar(&mut out, "After Left Factoring", &factored);
    out
}

fn write_grammar(out: &mut String, title: &str, grammar: &Grammar) {
    out.push_str(&format!("\n== {title} ==\n{grammar}"));
}

fn write_set(out: &mut String, name: &str, symbol: &str, set: &BTreeSet<String>) {
    let members = set.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    out.push_str(&format!("{name}({symbol}) = {{ {members} }}\n"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_appear_in_order() {
        let report = report();
        let sections = [
            "== Original Grammar ==",
            "FIRST sets:",
            "FOLLOW sets:",
            "== After Left Recursion Elimination ==",
            "== After Left Factoring ==",
        ];

        let offsets: Vec<_> = sections
            .iter()
            .map(|section| report.find(section).unwrap())
            .collect();
        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn demo_sets() {
        let report = report();
        assert!(report.contains("FIRST(E) = { (, id }\n"));
        assert!(report.contains("FIRST(ST) = { id, int, print }\n"));
        assert!(report.contains("FOLLOW(S) = { $ }\n"));
        assert!(report.contains("FOLLOW(ST) = { $, id, int, print }\n"));
        assert!(report.contains("FOLLOW(E) = { ), +, -, ; }\n"));
        assert!(report.contains("FOLLOW(F) = { ), *, +, -, /, ; }\n"));
        assert!(!report.contains("FIRST(+)"));
    }

    #[test]
    fn demo_rewrites() {
        let report = report();
        assert!(report.contains("E' -> + T E' | - T E' | ε\n"));
        assert!(report.contains("ST -> int id ; ST' | id = E ; ST' | print ( E ) ; ST'\n"));
        assert!(report.contains("ST' -> ST ST' | ε\n"));
    }

    #[test]
    fn report_is_deterministic() {
        assert_eq!(report(), report());
    }
}
