//! Human-readable plan and execution reports

use super::context::{ExecutionReport, TokenStatus};
use super::factory::MergerTokenFactory;
use super::merger::{reference_graph, MergePlan};
use crate::graph::{DepthFirstStampSearch, Digraph, Stamp};
use crate::model::DataMap;

/// Print the plan to stdout, one token per entry with the SQL it renders to
pub fn print_plan(plan: &MergePlan, factory: &dyn MergerTokenFactory) {
    println!("=== Merge Plan ({}) ===", factory.dialect());
    println!();

    if plan.is_empty() {
        println!("No changes (schema is up to date)");
        return;
    }

    for (index, token) in plan.tokens.iter().enumerate() {
        println!(
            "{:>3}. [{}] {} {}",
            index + 1,
            token.direction(),
            token.token_name(),
            token.token_value()
        );
        match token.create_sql(factory) {
            Ok(statements) => {
                for sql in statements {
                    println!("       {}", sql);
                }
            }
            Err(e) => println!("       ({})", e),
        }
    }

    if !plan.warnings.is_empty() {
        println!();
        println!("Warnings ({}):", plan.warnings.len());
        for warning in &plan.warnings {
            println!("  {}", warning);
        }
    }
}

/// Print per-token results followed by a summary line
pub fn print_execution(report: &ExecutionReport) {
    println!("=== Execution ===");
    println!();

    for outcome in &report.outcomes {
        match &outcome.status {
            TokenStatus::Executed(executed) => println!("OK       {} ({})", outcome.token, executed),
            TokenStatus::Unsupported(reason) => println!("SKIPPED  {} ({})", outcome.token, reason),
            TokenStatus::Failed(failures) => {
                println!("FAILED   {}", outcome.token);
                for failure in failures {
                    println!("  {}", failure);
                }
            }
        }
    }

    println!();
    println!(
        "=== Summary: {} executed, {} unsupported, {} failed ===",
        report.executed_count(),
        report.unsupported_count(),
        report.failed_count()
    );
}

/// Tables as a forest of FK dependencies: each table is listed under the
/// table it references. Tables inside a reference cycle start their own tree.
pub fn format_dependency_tree(map: &DataMap) -> String {
    let graph = reference_graph(map);
    let Some(first) = graph.vertices().first() else {
        return String::new();
    };

    let roots = graph
        .vertices()
        .iter()
        .filter(|v| graph.incoming_count(v) == 0)
        .chain(graph.vertices().iter());

    let mut out = String::new();
    let mut search = DepthFirstStampSearch::new(&graph, first.clone());
    for root in roots {
        search.reset(root.clone());
        while let Some((stamp, table)) = search.next() {
            if matches!(stamp, Stamp::GrowDepth | Stamp::GrowBreadth) {
                let indent = "  ".repeat(search.depth().saturating_sub(1));
                out.push_str(&format!("{}{}\n", indent, table));
            }
        }
    }
    out
}
