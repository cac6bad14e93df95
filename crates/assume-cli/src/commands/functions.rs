use crate::support::print_json_or_exit;
use assume_kernel::catalog::CATALOG_KIND;
use assume_kernel::{catalog, catalog_json};

pub fn run(json_output: bool) {
    if json_output {
        print_json_or_exit(&catalog_json(), "function catalog");
        return;
    }

    let functions = catalog();
    println!("assume functions");
    println!("  Schema: 1");
    println!("  Catalog kind: {CATALOG_KIND}");
    println!("  Functions: {}", functions.len());
    for signature in functions {
        let params: Vec<&str> = signature.params.iter().map(|p| p.name).collect();
        println!("  - {}({})", signature.name, params.join(", "));
        println!("      {}", signature.description);
    }
}
