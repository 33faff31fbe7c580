use anyhow::{Context, Result};
use log::info;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    assemble::RecordAssembler,
    cli::GenerateArgs,
    generators::ValueRange,
    io_utils,
    pool::{FieldPools, GenerateOptions},
    template::Template,
};

pub fn execute(args: &GenerateArgs) -> Result<()> {
    let source = io_utils::read_template(&args.example)?;
    let template = source
        .parse::<Template>()
        .with_context(|| format!("Parsing template {:?}", args.example))?;
    let options = GenerateOptions::new(args.count)
        .with_range(ValueRange {
            min: args.min,
            max: args.max,
        })
        .with_max_repeat(args.max_repeat);
    let output_path = args.output.as_deref();

    info!(
        "Generating {} record(s) from '{}' ({} pooled field(s), {} timestamp(s)) -> {}",
        options.count,
        args.example.display(),
        template.field_count(),
        template.timestamp_count(),
        io_utils::describe_output(output_path)
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let pools = FieldPools::build(&template, &options, &mut rng)
        .with_context(|| format!("Building value pools for {:?}", args.example))?;

    let mut writer = io_utils::open_output_writer(output_path)?;
    let written = RecordAssembler::new(&template, &pools).write_all(&mut writer)?;
    info!(
        "Wrote {} record(s) to {}",
        written,
        io_utils::describe_output(output_path)
    );
    Ok(())
}
