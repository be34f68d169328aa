// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, build the API client and hand it
//   to the menu loop.

use dhokla_cli::{api::ApiClient, ui::main_menu};

fn main() -> anyhow::Result<()> {
    // `RUST_LOG=debug` shows every request URL.
    env_logger::init();

    // Configured from the config file and `DHOKLA_*` environment
    // variables. See `config::Config::load`.
    let api = ApiClient::from_env()?;

    // Blocks until the user picks "Exit".
    main_menu(api)?;
    Ok(())
}
