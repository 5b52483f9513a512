use std::error::Error;

use indexmap::IndexSet;
use ramlib_libmap::Library;

fn run() -> Result<(), Box<dyn Error>> {
    let mut lib_files: Vec<String> = vec![];
    let mut defines: Vec<String> = vec![];
    {
        let mut parser = argparse::ArgumentParser::new();
        parser.set_description("Parse RAM library files and print them back in canonical form.");
        parser.refer(&mut lib_files).add_option(
            &["-l", "--lib"],
            argparse::Collect,
            "Library file with RAM cell definitions (can be given more than once)",
        );
        parser.refer(&mut defines).add_option(
            &["-D", "--define"],
            argparse::Collect,
            "Enable a condition checked by ifdef/ifndef within the library files",
        );
        parser.parse_args_or_exit();
    }

    let mut library = Library::new(IndexSet::from_iter(defines));
    for file in &lib_files {
        library.parse_file(file)?;
    }
    library.finish();
    print!("{}", library);
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(error) = run() {
        eprintln!("error: {}", error);
        std::process::exit(1)
    }
}
