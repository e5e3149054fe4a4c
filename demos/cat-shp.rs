extern crate encoding;
extern crate itertools;
extern crate shpio;
extern crate tracing_subscriber;

use std::env;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use itertools::Itertools;
use shpio::shapefile;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let mut args = env::args();

    if args.len() < 2 || args.len() > 3 {
        writeln!(&mut io::stderr(), "Usage: {} <SHP_PATH> [DBF_ENCODING]", args.next().unwrap_or_default()).unwrap();
        process::exit(1);
    }

    args.next();
    let path = PathBuf::from(args.next().unwrap());
    let encoding = match args.next() {
        None => encoding::all::UTF_8,
        Some(label) => match encoding::label::encoding_from_whatwg_label(&label) {
            Some(encoding) => encoding,
            None => {
                writeln!(&mut io::stderr(), "Unknown encoding: {}", label).unwrap();
                process::exit(1);
            }
        }
    };

    match shapefile::read_with_encoding(&path, encoding) {
        Err(err) => {
            writeln!(&mut io::stderr(), "{}", err).unwrap();
            process::exit(1);
        }
        Ok(collection) => {
            println!("{} {:?}", collection.shape_type, collection.bounding_box);
            println!("Fields: {}", collection.field_descriptors.iter().join(", "));

            for feature in collection.features.iter() {
                let geometry = match feature.geometry {
                    None => String::from("null"),
                    Some(ref g) => g.to_string(),
                };
                let attributes = feature.attributes.iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .join(" ");
                println!("#{} {} {}", feature.record_number, geometry, attributes);
            }

            for warning in collection.warnings.iter() {
                writeln!(&mut io::stderr(), "Warning: {}", warning).unwrap();
            }

            println!("Read {} records", collection.len());
        }
    }
}
