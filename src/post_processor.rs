use std::io::{BufWriter, Write};

use json::JsonValue;
use log::info;

use crate::{datatypes::MeshResult, error::PlateMeshError};

fn create_file(path: &str) -> Result<BufWriter<std::fs::File>, PlateMeshError> {
    match std::fs::File::create(path) {
        Ok(f) => Ok(BufWriter::new(f)),
        Err(err) => Err(PlateMeshError::PostProcessor(format!(
            "Failed to create {path}: {err}"
        ))),
    }
}

fn write_error(path: &str, err: std::io::Error) -> PlateMeshError {
    PlateMeshError::PostProcessor(format!("Failed to write {path}: {err}"))
}

/// Writes the node table as `x,y,z` rows
pub fn write_nodes_csv<W: Write>(mesh: &MeshResult, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "x,y,z")?;
    for node in mesh.coordinates.iter() {
        writeln!(out, "{},{},{}", node.x, node.y, node.z)?;
    }
    Ok(())
}

/// Writes the element table as `n0,n1,n2,n3` rows
pub fn write_elements_csv<W: Write>(mesh: &MeshResult, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "n0,n1,n2,n3")?;
    for element in mesh.elements.iter() {
        let [n0, n1, n2, n3] = element.nodes;
        writeln!(out, "{n0},{n1},{n2},{n3}")?;
    }
    Ok(())
}

/// Writes a mesh to two CSV files
///
/// # Arguments
/// * `mesh` - The mesh to export
/// * `nodes_output` - The filename of the output nodes csv
/// * `elements_output` - The filename of the output elements csv
pub fn csv_output(
    mesh: &MeshResult,
    nodes_output: &str,
    elements_output: &str,
) -> Result<(), PlateMeshError> {
    let mut nodes_file = create_file(nodes_output)?;
    write_nodes_csv(mesh, &mut nodes_file)
        .and_then(|_| nodes_file.flush())
        .map_err(|err| write_error(nodes_output, err))?;

    let mut elements_file = create_file(elements_output)?;
    write_elements_csv(mesh, &mut elements_file)
        .and_then(|_| elements_file.flush())
        .map_err(|err| write_error(elements_output, err))?;

    info!("wrote output to {} and {}", nodes_output, elements_output);

    Ok(())
}

/// Builds a json document holding the whole mesh
pub fn mesh_to_json(mesh: &MeshResult) -> JsonValue {
    let coordinates: Vec<JsonValue> = mesh
        .coordinates
        .iter()
        .map(|node| json::array![node.x, node.y, node.z])
        .collect();
    let elements: Vec<JsonValue> = mesh
        .elements
        .iter()
        .map(|element| JsonValue::from(element.nodes.to_vec()))
        .collect();

    json::object! {
        nnode: mesh.nnode,
        nel: mesh.nel,
        coordinates: coordinates,
        elements: elements,
    }
}

/// Writes a mesh to a json file
///
/// # Arguments
/// * `mesh` - The mesh to export
/// * `output` - The output filename
pub fn json_output(mesh: &MeshResult, output: &str) -> Result<(), PlateMeshError> {
    let mut file = create_file(output)?;
    mesh_to_json(mesh)
        .write_pretty(&mut file, 2)
        .and_then(|_| file.flush())
        .map_err(|err| write_error(output, err))?;

    info!("wrote output to {}", output);

    Ok(())
}
