use std::error::Error;
use std::fs;
use std::io::{self, Read};

use nbt::ByteOrder;

fn main() -> Result<(), Box<dyn Error>> {
    let mut order = ByteOrder::BigEndian;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--le" => order = ByteOrder::LittleEndian,
            "--be" => order = ByteOrder::BigEndian,
            _ => path = Some(arg),
        }
    }

    let data = match path.as_deref() {
        None | Some("-") => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
        Some(path) => fs::read(path)?,
    };

    let text = nbt_text::nbt2text(&data, order)?;
    println!("{}", text);
    Ok(())
}
