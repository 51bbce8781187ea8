use std::env;

fn main() {
    // Burn-in defaults from environment variables (optional)

    // Number of full erase/write/verify cycles (default: 5)
    if let Ok(cycles) = env::var("BURN_IN_CYCLES") {
        println!("cargo:rustc-env=BURN_IN_CYCLES={}", cycles);
        println!(
            "cargo:warning=Using BURN_IN_CYCLES from environment: {}",
            cycles
        );
    } else {
        println!("cargo:rustc-env=BURN_IN_CYCLES=5");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=BURN_IN_CYCLES");
}
