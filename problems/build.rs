use std::{
    env,
    error::Error,
    fs::{self, File},
    io::Write,
    path::PathBuf,
    process,
};

/// One row of `problem-codes.csv`.
struct ProblemDef {
    /// The code that users see, for example `P0003`. Stable between releases.
    code: String,
    /// The variant name in the generated enumeration.
    name: String,
    /// Constant description of the problem.
    message: String,
}

fn read_definitions(src: &str) -> Result<Vec<ProblemDef>, Box<dyn Error>> {
    let mut defs = vec![];
    let mut rdr = csv::Reader::from_reader(src.as_bytes());
    for result in rdr.records() {
        let record = result?;
        let column = |idx: usize| {
            record
                .get(idx)
                .map(|s| s.trim().to_string())
                .ok_or_else(|| format!("Record {:?} is not valid at column {}", record, idx))
        };
        defs.push(ProblemDef {
            code: column(0)?,
            name: column(1)?,
            message: column(2)?,
        });
    }
    Ok(defs)
}

fn write_enum(out: &mut File, defs: &[ProblemDef]) -> Result<(), Box<dyn Error>> {
    writeln!(out, "/// A category of problem that xpathgrep can report.")?;
    writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq)]")?;
    writeln!(out, "pub enum Problem {{")?;
    for def in defs {
        writeln!(out, "    /// {}", def.message)?;
        writeln!(out, "    {},", def.name)?;
    }
    writeln!(out, "}}\n")?;

    writeln!(out, "impl Problem {{")?;

    writeln!(out, "    /// Returns the code for the problem, for example `P0001`.")?;
    writeln!(out, "    pub fn code(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for def in defs {
        writeln!(out, "            Problem::{} => \"{}\",", def.name, def.code)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}\n")?;

    writeln!(out, "    /// Returns the constant message for the problem.")?;
    writeln!(out, "    pub fn message(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for def in defs {
        writeln!(
            out,
            "            Problem::{} => {:?},",
            def.name, def.message
        )?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;

    writeln!(out, "}}")?;
    Ok(())
}

fn create_problems() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=resources/problem-codes.csv");

    let mut src_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    src_path.push("resources");
    src_path.push("problem-codes.csv");

    let src = fs::read_to_string(&src_path)
        .map_err(|e| format!("Unable to read {}: {}", src_path.display(), e))?;
    let defs = read_definitions(&src)?;

    let mut out_path = PathBuf::from(env::var("OUT_DIR")?);
    fs::create_dir_all(&out_path)
        .map_err(|e| format!("Unable to create output directory: {}", e))?;
    out_path.push("problems.rs");

    let mut out =
        File::create(&out_path).map_err(|e| format!("Unable to create 'problems.rs': {}", e))?;
    write_enum(&mut out, &defs)?;
    out.flush()?;

    Ok(())
}

fn main() {
    if let Err(err) = create_problems() {
        println!("problem generating problems.rs: {}", err);
        process::exit(1);
    }
}
