//! List analyzers command implementation.

use mesh_lint_analyzers::all_analyzers;

/// Runs the list-analyzers command.
pub fn run() {
    println!("Available analyzers:\n");
    println!("{:<34} Description", "Name");
    println!("{}", "-".repeat(80));

    for analyzer in all_analyzers() {
        let meta = analyzer.metadata();
        println!("{:<34} {}", meta.name, meta.description);
        let inputs: Vec<_> = meta.inputs.iter().map(ToString::to_string).collect();
        println!("{:<34} inputs: {}", "", inputs.join(", "));
    }

    println!("\nUse --analyzers to run specific analyzers, e.g.:");
    println!("  mesh-lint analyze --analyzers virtualservice.RegexAnalyzer ./manifests");
}
