use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{file_display_name, load_ksm},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct KsmInfo {
    pub file: String,
    pub payload_size: usize,
    pub argument_index_width: u8,
    pub debug_index_width: u8,
    pub argument_count: usize,
    pub code_unit_count: usize,
    pub instruction_count: usize,
    pub debug_line_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<UnitInfo>,
}

#[derive(Debug, Serialize)]
pub struct UnitInfo {
    pub function_instructions: usize,
    pub init_instructions: usize,
    pub main_instructions: usize,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let (file, ksm) = load_ksm(path)?;

    let units: Vec<UnitInfo> = ksm
        .units()
        .iter()
        .map(|unit| UnitInfo {
            function_instructions: unit.function.len(),
            init_instructions: unit.init.len(),
            main_instructions: unit.main.len(),
        })
        .collect();

    let info = KsmInfo {
        file: file_display_name(path),
        payload_size: file.len(),
        argument_index_width: ksm.index_width(),
        debug_index_width: ksm.debug().index_width,
        argument_count: ksm.arguments().len(),
        code_unit_count: ksm.units().len(),
        instruction_count: ksm.instruction_count(),
        debug_line_count: ksm.debug().lines.len(),
        units,
    };

    print_output(&info, opts, |info| {
        println!("File:                 {}", info.file);
        println!("Payload size:         {} bytes", info.payload_size);
        println!("Argument index width: {}", info.argument_index_width);
        println!("Debug index width:    {}", info.debug_index_width);
        println!("Arguments:            {}", info.argument_count);
        println!("Code units:           {}", info.code_unit_count);
        println!("Instructions:         {}", info.instruction_count);
        println!("Debug lines:          {}", info.debug_line_count);

        if !info.units.is_empty() {
            println!("\nUnits:");
            let mut tw = TabWriter::new(vec![
                ("Unit", Align::Right),
                ("Function", Align::Right),
                ("Init", Align::Right),
                ("Main", Align::Right),
            ])
            .indent("  ");
            for (index, unit) in info.units.iter().enumerate() {
                tw.row(vec![
                    (index + 1).to_string(),
                    unit.function_instructions.to_string(),
                    unit.init_instructions.to_string(),
                    unit.main_instructions.to_string(),
                ]);
            }
            tw.print();
        }
    })
}
