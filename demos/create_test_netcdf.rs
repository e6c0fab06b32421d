//! Creates a sample NetCDF file for trying out seasonal_cycle.
//!
//! The file mimics monthly CESM surface temperature output: a `TS(time, lat,
//! lon)` variable in Kelvin on a noleap calendar, with a seasonal cycle that
//! flips sign across the equator, a warming trend and a few masked points.

use netcdf::create;
use std::f64::consts::PI;
use std::path::Path;

const YEARS: usize = 11;
const NOLEAP_MONTH_START: [f64; 12] = [
    0.0, 31.0, 59.0, 90.0, 120.0, 151.0, 181.0, 212.0, 243.0, 273.0, 304.0, 334.0,
];
const FILL: f32 = 1.0e36;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("test_data.nc");

    println!("🔨 Creating test NetCDF file: {}", output_path.display());

    // Remove existing file if it exists
    if output_path.exists() {
        std::fs::remove_file(output_path)?
    }

    let mut file = create(output_path)?;

    file.add_attribute("title", "Synthetic monthly surface temperature")?;
    file.add_attribute("source", "create_test_netcdf.rs")?;

    let n_time = YEARS * 12;
    let lats: Vec<f32> = (0..19).map(|i| -90.0 + i as f32 * 10.0).collect();
    let lons: Vec<f32> = (0..36).map(|i| i as f32 * 10.0).collect();

    file.add_dimension("time", n_time)?;
    file.add_dimension("lat", lats.len())?;
    file.add_dimension("lon", lons.len())?;

    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 1990-01-01 00:00:00")?;
        time_var.put_attribute("long_name", "time")?;
        time_var.put_attribute("calendar", "noleap")?;

        // Mid-month timestamps
        let offsets: Vec<f64> = (0..n_time)
            .map(|i| 365.0 * (i / 12) as f64 + NOLEAP_MONTH_START[i % 12] + 14.0)
            .collect();
        time_var.put_values(&offsets, ..)?;
    }

    {
        let mut lat_var = file.add_variable::<f32>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_attribute("long_name", "latitude")?;
        lat_var.put_values(&lats, ..)?;
    }

    {
        let mut lon_var = file.add_variable::<f32>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_attribute("long_name", "longitude")?;
        lon_var.put_values(&lons, ..)?;
    }

    {
        let mut ts_var = file.add_variable::<f32>("TS", &["time", "lat", "lon"])?;
        ts_var.put_attribute("units", "K")?;
        ts_var.put_attribute("long_name", "Surface temperature (radiative)")?;
        ts_var.put_attribute("_FillValue", FILL)?;

        let mut data = Vec::with_capacity(n_time * lats.len() * lons.len());
        for i in 0..n_time {
            let month = (i % 12 + 1) as f64;
            for &lat in &lats {
                let lat = f64::from(lat);
                for &lon in &lons {
                    if lat.abs() >= 90.0 && lon > 0.0 {
                        // Only one point per pole carries data
                        data.push(FILL);
                        continue;
                    }
                    let base = 300.0 - 40.0 * (lat.to_radians().sin()).powi(2);
                    let seasonal = -8.0 * (lat / 90.0) * (2.0 * PI * (month - 1.0) / 12.0).cos();
                    let zonal = 1.5 * (f64::from(lon).to_radians()).sin();
                    let trend = 0.002 * i as f64;
                    data.push((base + seasonal + zonal + trend) as f32);
                }
            }
        }
        ts_var.put_values(&data, ..)?;
    }

    println!("✅ Successfully created test NetCDF file with:");
    println!("   📏 Dimensions: time({n_time}), lat({}), lon({})", lats.len(), lons.len());
    println!("   📈 Variables: time (noleap), lat, lon, TS [K]");
    println!("\n🧪 Compute the equatorial Pacific seasonal cycle with:");
    println!("   cargo run -- -f test_data.nc --lat -5 5 --lon 180 240");

    Ok(())
}
