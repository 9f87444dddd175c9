//! Supports reading projection parameters from YAML file (optional)

use std::path::Path;
use tracing::debug;
use yaml_rust2::{Yaml, YamlLoader};

use crate::parameter_error::ParameterError;
use crate::parameters::Parameters;

const ROS_PARAMETERS: &str = "ros__parameters";

impl Parameters {
    /// Read the projection parameters from YAML file. Both a flat mapping and the ROS 2
    /// parameter file layout are supported:
    /// ```yaml
    /// pointcloud_to_laserscan:
    ///   ros__parameters:
    ///     target_frame: base_link
    ///     transform_tolerance: 0.01
    ///     min_height: 0.40
    ///     max_height: 1.5
    ///     angle_min: -3.141592654
    ///     angle_max: 3.141592654
    ///     angle_increment: 0.003141592
    ///     scan_time: 0.2
    ///     range_min: 0.3
    ///     range_max: 40.0
    ///     use_inf: true
    ///     inf_epsilon: 1.0
    /// ```
    /// Parameters not present in the file keep their defaults. Unknown parameters, values of the
    /// wrong type and inconsistent values are errors. `.inf` and `-.inf` are accepted for the
    /// height limits and `range_max`.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Same as [`Parameters::from_yaml_file`] from the YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let documents = YamlLoader::load_from_str(contents)
            .map_err(|e| ParameterError::ParseError(format!("{}", e)))?;
        let root = documents
            .first()
            .ok_or_else(|| ParameterError::ParseError("YAML document is empty".to_string()))?;

        let mut parameters = Parameters::default();
        let mapping = parameter_mapping(root)?
            .as_hash()
            .ok_or_else(|| ParameterError::ParseError("parameters must be a mapping".to_string()))?;

        for (key, value) in mapping.iter() {
            let name = key.as_str().ok_or_else(|| {
                ParameterError::ParseError(format!("parameter name must be a string (got {:?})", key))
            })?;
            debug!("Parameter {} = {:?}", name, value);
            match name {
                "target_frame" => parameters.target_frame = string(name, value)?,
                "transform_tolerance" => parameters.transform_tolerance = number(name, value)?,
                "min_height" => parameters.min_height = number(name, value)?,
                "max_height" => parameters.max_height = number(name, value)?,
                "angle_min" => parameters.angle_min = number(name, value)?,
                "angle_max" => parameters.angle_max = number(name, value)?,
                "angle_increment" => parameters.angle_increment = number(name, value)?,
                "scan_time" => parameters.scan_time = number(name, value)?,
                "range_min" => parameters.range_min = number(name, value)?,
                "range_max" => parameters.range_max = number(name, value)?,
                "use_inf" => parameters.use_inf = boolean(name, value)?,
                "inf_epsilon" => parameters.inf_epsilon = number(name, value)?,
                unknown => return Err(ParameterError::UnknownParameter(unknown.to_string())),
            }
        }

        parameters.validate()?;
        Ok(parameters)
    }
}

/// Finds the mapping that holds the parameters: either the root itself, `ros__parameters`
/// directly under the root, or `ros__parameters` under the single node name.
fn parameter_mapping(root: &Yaml) -> Result<&Yaml, ParameterError> {
    let hash = root
        .as_hash()
        .ok_or_else(|| ParameterError::ParseError("top level must be a mapping".to_string()))?;

    let direct = &root[ROS_PARAMETERS];
    if !direct.is_badvalue() {
        return Ok(direct);
    }

    if hash.len() == 1 {
        if let Some((node_name, node)) = hash.iter().next() {
            let nested = &node[ROS_PARAMETERS];
            if !nested.is_badvalue() {
                debug!("Reading parameters of node {:?}", node_name);
                return Ok(nested);
            }
        }
    }
    Ok(root)
}

fn number(name: &str, value: &Yaml) -> Result<f64, ParameterError> {
    match value {
        Yaml::Integer(i) => Ok(*i as f64),
        Yaml::Real(_) => value.as_f64().ok_or_else(|| wrong_type(name, "a number")),
        _ => Err(wrong_type(name, "a number")),
    }
}

fn boolean(name: &str, value: &Yaml) -> Result<bool, ParameterError> {
    value.as_bool().ok_or_else(|| wrong_type(name, "true or false"))
}

fn string(name: &str, value: &Yaml) -> Result<String, ParameterError> {
    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| wrong_type(name, "a string"))
}

fn wrong_type(name: &str, expected: &'static str) -> ParameterError {
    ParameterError::WrongType {
        name: name.to_string(),
        expected,
    }
}
