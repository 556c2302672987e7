use std::process::ExitCode;

use eframe::egui;
use vehicle_dash::app::VehicleDashApp;
use vehicle_dash::config::CliArgs;
use vehicle_dash::data::loader::check_columns;

fn main() -> ExitCode {
    env_logger::init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    if args.check_columns {
        return match check_columns(&args.config.data_path) {
            Ok(report) => {
                print!("{}", report.render());
                if report.missing().is_empty() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    log::info!("Starting with {:?}", args.config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    let config = args.config;
    let result = eframe::run_native(
        "Vehicle Dash – Used Car Listings",
        options,
        Box::new(move |_cc| Ok(Box::new(VehicleDashApp::new(config)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("UI exited with error: {e}");
            ExitCode::FAILURE
        }
    }
}
