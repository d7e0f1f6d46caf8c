use std::process::ExitCode;

fn main() -> ExitCode {
    match pascalc_drv::run(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}
