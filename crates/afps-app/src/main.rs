use std::process;

use log::error;

use afps_app::cli::{create_clap_command, RunOptions};
use afps_app::game_loop;
use afps_app::logging::init_logging;

fn main() {
    let matches = create_clap_command().get_matches();
    let options = match RunOptions::from_matches(&matches) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    if let Err(e) = init_logging(options.log_level, options.log_file.as_deref()) {
        eprintln!("{e}");
        process::exit(1);
    }

    if let Err(e) = game_loop::run_with_options(&options) {
        error!("{e}");
        process::exit(1);
    }
}
