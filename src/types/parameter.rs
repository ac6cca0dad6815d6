//! Defines the `Parameter` enum, the fixed set of observation fields the DMI
//! metObs service accepts as `parameterId`.

use crate::client::error::ClientError;
use std::fmt;
use std::str::FromStr;

macro_rules! parameters {
    ($($(#[$doc:meta])* $variant:ident => $id:literal,)+) => {
        /// A measured field that can be requested from the observation endpoint.
        ///
        /// Parse user input with [`str::parse`]; anything outside the allow-list is
        /// rejected with [`ClientError::UnknownField`].
        ///
        /// ```
        /// use metobs::Parameter;
        ///
        /// let p: Parameter = "temp_dry".parse().unwrap();
        /// assert_eq!(p, Parameter::TempDry);
        /// assert_eq!(p.to_string(), "temp_dry");
        /// assert!("made_up_field".parse::<Parameter>().is_err());
        /// ```
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Parameter {
            $($(#[$doc])* $variant,)+
        }

        impl Parameter {
            /// Every accepted parameter, in the order DMI documents them.
            pub const ALL: &'static [Parameter] = &[$(Parameter::$variant,)+];

            /// The identifier sent as `parameterId`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Parameter::$variant => $id,)+
                }
            }
        }

        impl FromStr for Parameter {
            type Err = ClientError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($id => Ok(Parameter::$variant),)+
                    other => Err(ClientError::UnknownField(other.to_string())),
                }
            }
        }
    };
}

parameters! {
    /// Air temperature, 2 m above ground.
    TempDry => "temp_dry",
    /// Dew point temperature.
    TempDew => "temp_dew",
    TempMeanPast1h => "temp_mean_past1h",
    TempMaxPast1h => "temp_max_past1h",
    TempMinPast1h => "temp_min_past1h",
    TempMaxPast12h => "temp_max_past12h",
    TempMinPast12h => "temp_min_past12h",
    /// Grass temperature.
    TempGrass => "temp_grass",
    TempGrassMaxPast1h => "temp_grass_max_past1h",
    TempGrassMeanPast1h => "temp_grass_mean_past1h",
    TempGrassMinPast1h => "temp_grass_min_past1h",
    /// Soil temperature at 10 cm depth.
    TempSoil => "temp_soil",
    TempSoilMaxPast1h => "temp_soil_max_past1h",
    TempSoilMinPast1h => "temp_soil_min_past1h",
    TempSoilMeanPast1h => "temp_soil_mean_past1h",
    /// Relative humidity in percent.
    Humidity => "humidity",
    HumidityPast1h => "humidity_past1h",
    /// Pressure reduced to mean sea level, hPa.
    PressureAtSea => "pressure_at_sea",
    /// Station pressure, hPa.
    Pressure => "pressure",
    /// Mean wind speed over the last 10 minutes, m/s.
    WindSpeed => "wind_speed",
    WindMax => "wind_max",
    WindMin => "wind_min",
    /// Wind direction in degrees.
    WindDir => "wind_dir",
    WindDirPast1h => "wind_dir_past1h",
    WindSpeedPast1h => "wind_speed_past1h",
    WindGustAlwaysPast1h => "wind_gust_always_past1h",
    WindMinPast1h => "wind_min_past1h",
    WindMaxPer10minPast1h => "wind_max_per10min_past1h",
    PrecipPast10min => "precip_past10min",
    /// Accumulated precipitation over the last hour, mm.
    PrecipPast1h => "precip_past1h",
    PrecipPast1min => "precip_past1min",
    PrecipPast24h => "precip_past24h",
    PrecipDurPast10min => "precip_dur_past10min",
    PrecipDurPast1h => "precip_dur_past1h",
    /// Manually observed snow depth.
    SnowDepthMan => "snow_depth_man",
    SnowCoverMan => "snow_cover_man",
    Visibility => "visibility",
    VisibMeanLast10min => "visib_mean_last10min",
    CloudHeight => "cloud_height",
    CloudCover => "cloud_cover",
    /// Present weather code.
    Weather => "weather",
    SunLast10minGlob => "sun_last10min_glob",
    /// Global radiation, W/m².
    RadiaGlob => "radia_glob",
    RadiaGlobPast1h => "radia_glob_past1h",
    SunLast1hGlob => "sun_last1h_glob",
    LeavHumDurPast10min => "leav_hum_dur_past10min",
    LeavHumDurPast1h => "leav_hum_dur_past1h",
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_parameters_round_trip() {
        for p in Parameter::ALL {
            assert_eq!(p.as_str().parse::<Parameter>().unwrap(), *p);
        }
    }

    #[test]
    fn test_allow_list_is_unique() {
        let ids: HashSet<&str> = Parameter::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(ids.len(), Parameter::ALL.len());
        assert_eq!(Parameter::ALL.len(), 47);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = "made_up_field".parse::<Parameter>().unwrap_err();
        assert!(matches!(err, ClientError::UnknownField(ref f) if f == "made_up_field"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_field_matching_is_exact() {
        assert!("TEMP_DRY".parse::<Parameter>().is_err());
        assert!(" temp_dry".parse::<Parameter>().is_err());
        assert!("precip_past24h*".parse::<Parameter>().is_err());
    }
}
