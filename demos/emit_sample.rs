use paramdoc_rs::{MetadataEmitter, Parameter, ParameterGroup, Tables};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let plane = ParameterGroup::new("ArduPlane").with_param(
        Parameter::new("FOOPARM")
            .with_field("DisplayName", "Foo Parameter")
            .with_field("Description", "does foo")
            .with_field("Units", "A/s")
            .with_field("Values", "0:Disabled,1:Enabled"),
    );
    let battery = ParameterGroup::new("BATT_").with_param(
        Parameter::new("BATT_CAPACITY")
            .with_field("User", "Standard")
            .with_field("Units", "mAh")
            .with_field("Increment", "50"),
    );

    let mut emitter = MetadataEmitter::new(Vec::new(), Tables::ardupilot())?;
    emitter.emit_comment("demo output")?;
    emitter.emit(&plane)?;
    emitter.start_libraries();
    emitter.emit(&battery)?;
    let (xml, stats) = emitter.finish_into_inner()?;
    info!(params = stats.params, "emitted demo document");

    println!("{}", String::from_utf8(xml)?);
    Ok(())
}
