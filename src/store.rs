// StrideWatch: NVS Settings Store
//
// Overrides live in the `stridewatch` NVS namespace. Floats are stored as
// strings (e.g. "2.5") so they can be provisioned with the stock partition
// generator. A missing key keeps the default; a read failure or an
// unparseable value fails settings load.

use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::sys::EspError;

use stridewatch::config::NVS_NAMESPACE;
use stridewatch::settings::{parse_value, SettingsStore};
use stridewatch::SettingsError;

const MAX_STR_LEN: usize = 128;

pub struct NvsStore {
    nvs: EspNvs<NvsDefault>,
}

impl NvsStore {
    pub fn open(partition: EspDefaultNvsPartition) -> anyhow::Result<Self> {
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        Ok(Self { nvs })
    }

    fn checked<T>(key: &'static str, result: Result<Option<T>, EspError>) -> Result<Option<T>, SettingsError> {
        result.map_err(|e| SettingsError::Storage { key, reason: e.to_string() })
    }
}

impl SettingsStore for NvsStore {
    fn get_f32(&self, key: &'static str) -> Result<Option<f32>, SettingsError> {
        self.get_str(key)?
            .map(|text| parse_value(key, &text))
            .transpose()
    }

    fn get_u32(&self, key: &'static str) -> Result<Option<u32>, SettingsError> {
        Self::checked(key, self.nvs.get_u32(key))
    }

    fn get_i32(&self, key: &'static str) -> Result<Option<i32>, SettingsError> {
        Self::checked(key, self.nvs.get_i32(key))
    }

    fn get_str(&self, key: &'static str) -> Result<Option<String>, SettingsError> {
        let mut buf = [0u8; MAX_STR_LEN];
        let value = self.nvs.get_str(key, &mut buf).map(|v| v.map(str::to_string));
        Self::checked(key, value)
    }
}
