//! Concrete master-data record types.

use std::sync::OnceLock;

use crate::error::{LoadError, LoadResult};
use crate::types::{DataType, Field, MasterRecord, Schema, Value};

/// Planet master record (table `planet`).
///
/// Text column order: `id`, `name`, `name_jp`, `rotation_center_planet_id`, `radius`,
/// `gravity`, `orbital_speed`, `light_intensity`, `light_outer_radius`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetMaster {
    /// Primary key.
    pub id: i64,
    pub name: String,
    /// Localized (Japanese) name.
    pub name_jp: String,
    /// Id of the planet this one orbits (`0` for none).
    pub rotation_center_planet_id: i64,
    pub radius: f64,
    pub gravity: f64,
    pub orbital_speed: f64,
    pub light_intensity: f64,
    pub light_outer_radius: f64,
}

impl MasterRecord for PlanetMaster {
    type Key = i64;

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(
                "planet",
                vec![
                    Field::new("id", DataType::Int64),
                    Field::new("name", DataType::Utf8),
                    Field::new("name_jp", DataType::Utf8),
                    Field::new("rotation_center_planet_id", DataType::Int64),
                    Field::new("radius", DataType::Float64),
                    Field::new("gravity", DataType::Float64),
                    Field::new("orbital_speed", DataType::Float64),
                    Field::new("light_intensity", DataType::Float64),
                    Field::new("light_outer_radius", DataType::Float64),
                ],
                0,
            )
        })
    }

    fn key(&self) -> i64 {
        self.id
    }

    fn from_values(values: Vec<Value>) -> LoadResult<Self> {
        let len = values.len();
        let values = <[Value; 9]>::try_from(values).map_err(|_| LoadError::SchemaMismatch {
            message: format!("planet: expected 9 values, got {len}"),
        })?;

        let [
            Value::Int64(id),
            Value::Utf8(name),
            Value::Utf8(name_jp),
            Value::Int64(rotation_center_planet_id),
            Value::Float64(radius),
            Value::Float64(gravity),
            Value::Float64(orbital_speed),
            Value::Float64(light_intensity),
            Value::Float64(light_outer_radius),
        ] = values
        else {
            return Err(LoadError::SchemaMismatch {
                message: "planet: value types do not match schema".to_string(),
            });
        };

        Ok(Self {
            id,
            name,
            name_jp,
            rotation_center_planet_id,
            radius,
            gravity,
            orbital_speed,
            light_intensity,
            light_outer_radius,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Int64(self.id),
            Value::Utf8(self.name.clone()),
            Value::Utf8(self.name_jp.clone()),
            Value::Int64(self.rotation_center_planet_id),
            Value::Float64(self.radius),
            Value::Float64(self.gravity),
            Value::Float64(self.orbital_speed),
            Value::Float64(self.light_intensity),
            Value::Float64(self.light_outer_radius),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::PlanetMaster;
    use crate::types::{MasterRecord, Value};

    fn mars() -> PlanetMaster {
        PlanetMaster {
            id: 1,
            name: "Mars".to_string(),
            name_jp: "火星".to_string(),
            rotation_center_planet_id: 0,
            radius: 3389.5,
            gravity: 3.72,
            orbital_speed: 24.1,
            light_intensity: 1.52,
            light_outer_radius: 0.1,
        }
    }

    #[test]
    fn planet_schema_has_nine_columns_keyed_by_id() {
        let schema = PlanetMaster::schema();
        assert_eq!(schema.table, "planet");
        assert_eq!(schema.required_columns(), 9);
        assert_eq!(schema.primary_key_field().name, "id");
    }

    #[test]
    fn planet_values_follow_schema_order() {
        let planet = mars();
        let values = planet.to_values();
        assert_eq!(values[0], Value::Int64(1));
        assert_eq!(values[2], Value::Utf8("火星".to_string()));
        assert_eq!(PlanetMaster::from_values(values).unwrap(), planet);
    }

    #[test]
    fn planet_from_values_rejects_wrong_types() {
        let mut values = mars().to_values();
        values[4] = Value::Utf8("3389.5".to_string());
        let err = PlanetMaster::from_values(values).unwrap_err();
        assert!(err.to_string().contains("value types do not match schema"));
    }

    #[test]
    fn planet_from_values_rejects_wrong_arity() {
        let err = PlanetMaster::from_values(vec![Value::Int64(1)]).unwrap_err();
        assert!(err.to_string().contains("expected 9 values, got 1"));
    }
}
