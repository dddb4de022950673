//
// ql570 /dev/usb/lp0 n label.png
// ql570 /dev/usb/lp0 29x90 - 120 < label.png
// ql570 /dev/usb/lp0 ping
//
use std::{
    env,
    fs::File,
    io::{self, BufReader, Read},
    process,
};

use log::debug;
use ql570::{
    parse_cutoff, transcode, DecodedImage, Error, Media, PrintOptions, Printer, DEFAULT_CUTOFF,
};

fn print_usage(cmd: &str) {
    eprintln!("Usage: {} <printer> <media> [<pngfile>|-] [cutoff]", cmd);
    eprintln!("       {} <printer> ping", cmd);
    eprintln!("  Where <media> is one of:");
    eprintln!(
        "    {}",
        Media::identifiers()
            .filter(|id| *id != "ping")
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!("  'n' is narrow paper (29 mm), 'w' is wide paper (62 mm) and '7' is the");
    eprintln!("  1.1\" x 3.5\" sample labels that ship with the QL-700.");
    eprintln!("  Without <pngfile>, or with '-', the image is read from standard input.");
    eprintln!(
        "  [cutoff] is the color to monochrome conversion cutoff, 1 to 254 (default: {}).",
        DEFAULT_CUTOFF
    );
    eprintln!("  Environment: QL570_CUTOFF, QL570_QUALITY=high|speed, QL570_CUT_EVERY=<n>,");
    eprintln!("  QL570_CUTTER=on|off (also read from a .env file).");
    eprintln!("  Example: {} /dev/usb/lp0 n image.png", cmd);
    eprintln!("  Hint: If the printer's status LED blinks red, then your media type is probably wrong.");
}

fn main() {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args: Vec<String> = env::args().collect();
    let cmd = args.get(0).map(String::as_str).unwrap_or("ql570");

    if args.iter().skip(1).any(|arg| arg == "--help" || arg == "-h") {
        print_usage(cmd);
        return;
    }

    if args.len() < 3 || args.len() > 5 {
        print_usage(cmd);
        process::exit(1);
    }

    match run(&args[1..]) {
        Ok(()) => (),
        Err(err @ Error::UnknownMedia(_)) => {
            eprintln!("Error: {}", err);
            print_usage(cmd);
            process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), Error> {
    let device = &args[0];
    let media = Media::lookup(&args[1])?;

    if media.is_ping() {
        let mut printer = Printer::open(device)?;
        printer.ping()?;
        return Ok(());
    }

    let cutoff = match args.get(3) {
        Some(value) => parse_cutoff(value)?,
        None => match env::var("QL570_CUTOFF") {
            Ok(value) => parse_cutoff(&value)?,
            Err(_) => DEFAULT_CUTOFF,
        },
    };
    let options = options_from_env()?;
    debug!("Cutoff {}, {:?}", cutoff, options);

    let mut printer = Printer::open(device)?;

    let image = match args.get(2).map(String::as_str) {
        None | Some("-") => read_stdin()?,
        Some(path) => {
            let file = File::open(path).map_err(|source| Error::ImageOpen {
                path: path.to_string(),
                source,
            })?;
            DecodedImage::read_png(BufReader::new(file))?
        }
    };

    let bitmap = transcode(&image, cutoff)?;
    printer.print(&bitmap, media, &options)?;
    Ok(())
}

fn read_stdin() -> Result<DecodedImage, Error> {
    let mut buf = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut buf)
        .map_err(|source| Error::ImageOpen {
            path: "<stdin>".to_string(),
            source,
        })?;
    DecodedImage::read_png(&buf[..])
}

fn options_from_env() -> Result<PrintOptions, Error> {
    let mut options = PrintOptions::new();

    if let Ok(quality) = env::var("QL570_QUALITY") {
        options = match quality.as_str() {
            "high" => options.high_quality(true),
            "speed" => options.high_quality(false),
            other => {
                return Err(Error::InvalidConfig(format!(
                    "QL570_QUALITY must be 'high' or 'speed', got {:?}",
                    other
                )))
            }
        };
    }

    let every = match env::var("QL570_CUT_EVERY") {
        Ok(value) => value.trim().parse::<u8>().map_err(|_| {
            Error::InvalidConfig(format!("QL570_CUT_EVERY must be 1 to 255, got {:?}", value))
        })?,
        Err(_) => 1,
    };

    match env::var("QL570_CUTTER").as_deref() {
        Ok("on") | Err(_) => Ok(options.enable_auto_cut(every)),
        Ok("off") => Ok(options.disable_auto_cut()),
        Ok(other) => Err(Error::InvalidConfig(format!(
            "QL570_CUTTER must be 'on' or 'off', got {:?}",
            other
        ))),
    }
}
