use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hair volume record as carried inside an envelope payload
///
/// Timestamps are kept in their wire string form until the consumer converts them for persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolumeReading {
    pub salon_id: String,
    pub salon_name: String,
    pub hair_volume: f64,
    pub disposal_method: String,
    pub batch_timestamp: String,
    pub reading_timestamp: String,
    pub trace_id: Uuid,
}

/// Hair type record as carried inside an envelope payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeReading {
    pub salon_id: String,
    pub salon_name: String,
    pub hair_colour: String,
    pub hair_texture: String,
    pub hair_thickness: f64,
    pub batch_timestamp: String,
    pub reading_timestamp: String,
    pub trace_id: Uuid,
}

/// Batch-submit request body for volume readings
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeBatch {
    pub salon_id: String,
    pub salon_name: String,
    pub reporting_timestamp: String,
    pub readings: Vec<VolumeBatchEntry>,
}

/// Single reading within a [`VolumeBatch`]
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeBatchEntry {
    pub hair_volume: f64,
    pub disposal_method: String,
    pub recorded_timestamp: String,
}

/// Batch-submit request body for type readings
#[derive(Debug, Clone, Deserialize)]
pub struct TypeBatch {
    pub salon_id: String,
    pub salon_name: String,
    pub reporting_timestamp: String,
    pub readings: Vec<TypeBatchEntry>,
}

/// Single reading within a [`TypeBatch`]
#[derive(Debug, Clone, Deserialize)]
pub struct TypeBatchEntry {
    pub hair_colour: String,
    pub hair_texture: String,
    pub hair_thickness: f64,
    pub recorded_timestamp: String,
}

impl VolumeBatch {
    /// Merges batch-level and per-reading fields into records, stamping each with a fresh trace id
    ///
    /// Record order matches the order of the submitted readings.
    pub fn into_records(self) -> Vec<VolumeReading> {
        let salon_id = self.salon_id;
        let salon_name = self.salon_name;
        let batch_timestamp = self.reporting_timestamp;

        self.readings
            .into_iter()
            .map(|reading| VolumeReading {
                salon_id: salon_id.clone(),
                salon_name: salon_name.clone(),
                hair_volume: reading.hair_volume,
                disposal_method: reading.disposal_method,
                batch_timestamp: batch_timestamp.clone(),
                reading_timestamp: reading.recorded_timestamp,
                trace_id: Uuid::new_v4(),
            })
            .collect()
    }
}

impl TypeBatch {
    /// Merges batch-level and per-reading fields into records, stamping each with a fresh trace id
    pub fn into_records(self) -> Vec<TypeReading> {
        let salon_id = self.salon_id;
        let salon_name = self.salon_name;
        let batch_timestamp = self.reporting_timestamp;

        self.readings
            .into_iter()
            .map(|reading| TypeReading {
                salon_id: salon_id.clone(),
                salon_name: salon_name.clone(),
                hair_colour: reading.hair_colour,
                hair_texture: reading.hair_texture,
                hair_thickness: reading.hair_thickness,
                batch_timestamp: batch_timestamp.clone(),
                reading_timestamp: reading.recorded_timestamp,
                trace_id: Uuid::new_v4(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume_batch() -> VolumeBatch {
        VolumeBatch {
            salon_id: "S-1".into(),
            salon_name: "Clip Joint".into(),
            reporting_timestamp: "2024-03-01 10:00:00".into(),
            readings: vec![
                VolumeBatchEntry {
                    hair_volume: 12.5,
                    disposal_method: "compost".into(),
                    recorded_timestamp: "2024-03-01 09:58:00".into(),
                },
                VolumeBatchEntry {
                    hair_volume: 7.0,
                    disposal_method: "landfill".into(),
                    recorded_timestamp: "2024-03-01 09:59:00".into(),
                },
            ],
        }
    }

    #[test]
    fn merges_batch_fields_into_each_record() {
        let records = volume_batch().into_records();

        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.salon_id, "S-1");
            assert_eq!(record.salon_name, "Clip Joint");
            assert_eq!(record.batch_timestamp, "2024-03-01 10:00:00");
        }
    }

    #[test]
    fn preserves_reading_order() {
        let records = volume_batch().into_records();

        assert_eq!(records[0].hair_volume, 12.5);
        assert_eq!(records[1].hair_volume, 7.0);
        assert_eq!(records[0].reading_timestamp, "2024-03-01 09:58:00");
    }

    #[test]
    fn stamps_distinct_trace_ids() {
        let records = volume_batch().into_records();

        assert_ne!(records[0].trace_id, records[1].trace_id);
    }

    #[test]
    fn type_batch_merges_and_stamps() {
        let batch = TypeBatch {
            salon_id: "S-2".into(),
            salon_name: "Shear Genius".into(),
            reporting_timestamp: "2024-03-01 11:00:00".into(),
            readings: vec![TypeBatchEntry {
                hair_colour: "auburn".into(),
                hair_texture: "wavy".into(),
                hair_thickness: 0.07,
                recorded_timestamp: "2024-03-01 10:59:00".into(),
            }],
        };

        let records = batch.into_records();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].salon_name, "Shear Genius");
        assert_eq!(records[0].batch_timestamp, "2024-03-01 11:00:00");
        assert_eq!(records[0].hair_thickness, 0.07);
    }
}
