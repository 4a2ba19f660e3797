pub mod meteostat;
