use json::JsonValue;

use crate::{datatypes::MeshParams, error::PlateMeshError, mesher};

/// Plate parameters as read from an input file. Any of them may be left out
/// and supplied on the command line instead.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlateInput {
    pub length: Option<f64>,
    pub breadth: Option<f64>,
    pub nx: Option<usize>,
    pub ny: Option<usize>,
}

impl PlateInput {
    /// Fills unset fields from `other`, keeping the values already set
    pub fn or(self, other: PlateInput) -> PlateInput {
        PlateInput {
            length: self.length.or(other.length),
            breadth: self.breadth.or(other.breadth),
            nx: self.nx.or(other.nx),
            ny: self.ny.or(other.ny),
        }
    }

    /// Converts into complete mesh parameters
    ///
    /// # Returns
    /// The parameters, or an input error naming the first missing field
    pub fn into_params(self) -> Result<MeshParams, PlateMeshError> {
        let missing = |name: &str| PlateMeshError::Input(format!("Missing plate {name}"));

        Ok(MeshParams {
            length: self.length.ok_or_else(|| missing("length"))?,
            breadth: self.breadth.ok_or_else(|| missing("breadth"))?,
            nx: self.nx.ok_or_else(|| missing("nx"))?,
            ny: self.ny.ok_or_else(|| missing("ny"))?,
        })
    }
}

/// Parses the input json into a JsonValue object
///
/// # Arguments
/// * `input_file` - The path to the input file
///
/// # Returns
/// A JsonValue object
pub fn load_input_file(input_file: &str) -> Result<JsonValue, PlateMeshError> {
    let file_string = match std::fs::read_to_string(input_file) {
        Ok(f) => f,
        Err(err) => {
            return Err(PlateMeshError::Input(format!(
                "Unable to open input file {input_file}: {err}"
            )))
        }
    };

    parse_input(&file_string)
}

/// Parses input file contents, checking the top level layout
pub fn parse_input(contents: &str) -> Result<JsonValue, PlateMeshError> {
    let input_json = match json::parse(contents) {
        Ok(j) => j,
        Err(err) => {
            return Err(PlateMeshError::Input(format!(
                "Error in input file json: {err}"
            )))
        }
    };

    if !input_json.has_key("plate") {
        return Err(PlateMeshError::Input(
            "Input json missing plate field".to_string(),
        ));
    }
    if !input_json["plate"].is_object() {
        return Err(PlateMeshError::Input(
            "Input json plate field must be an object".to_string(),
        ));
    }

    Ok(input_json)
}

/// Reads the plate section of an input file
///
/// # Arguments
/// * `input_json` - The input file as a JsonValue object
///
/// # Returns
/// The plate parameters present in the file
pub fn parse_plate(input_json: &JsonValue) -> Result<PlateInput, PlateMeshError> {
    let plate = &input_json["plate"];

    let dimension = |name: &str| -> Result<Option<f64>, PlateMeshError> {
        if !plate.has_key(name) {
            return Ok(None);
        }
        match plate[name].as_f64() {
            Some(v) => Ok(Some(v)),
            None => Err(PlateMeshError::Input(format!(
                "Bad value for plate {name}: {}",
                plate[name]
            ))),
        }
    };

    let subdivision = |name: &'static str| -> Result<Option<usize>, PlateMeshError> {
        match dimension(name)? {
            Some(v) => Ok(Some(mesher::subdivision_from_f64(name, v)?)),
            None => Ok(None),
        }
    };

    Ok(PlateInput {
        length: dimension("length")?,
        breadth: dimension("breadth")?,
        nx: subdivision("nx")?,
        ny: subdivision("ny")?,
    })
}
