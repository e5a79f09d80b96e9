#[cfg(not(target_arch = "wasm32"))]
mod cli;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::io::Result<()> {
    cli::main()
}

// The browser build is the cdylib; there is no binary for wasm32.
#[cfg(target_arch = "wasm32")]
fn main() {}
