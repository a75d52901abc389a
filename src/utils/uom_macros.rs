#![warn(missing_docs)]
//! Module for additional uom macros that facilitate the creation of single lengths / angles or
//! whole vectors of them (e.g. a set of focal lengths).
/// helper macro to create the units
#[macro_export]
macro_rules! uom_unit_creator {
    ($unit:ident, $unit_type:ident, $val1:expr) => {
        $unit_type::new::<$unit>($val1)
    };
    ($unit:ident, $unit_type:ident, $( $x:expr ),+) => {
        {
            use std::vec::Vec;
            let mut temp_vec = Vec::new();
            $(
                temp_vec.push($unit_type::new::<$unit>($x));
            )*
            temp_vec
        }
    };
}

///macro to create a Length in millimeter
#[macro_export]
macro_rules! millimeter {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Length, length::millimeter};
        $crate::uom_unit_creator![millimeter, Length, $( $x ),*]
    }};
}
///macro to create a Length in micrometer
#[macro_export]
macro_rules! micrometer {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Length, length::micrometer};
        $crate::uom_unit_creator![micrometer, Length, $( $x ),*]
    }};
}
///macro to create a Length in nanometer
#[macro_export]
macro_rules! nanometer {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Length, length::nanometer};
        $crate::uom_unit_creator![nanometer, Length, $( $x ),*]
    }};
}
///macro to create an angle in milliradian
#[macro_export]
macro_rules! milliradian {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Angle, angle::radian};
        $crate::uom_unit_creator![radian, Angle, $( 1e-3*$x ),*]
    }};
}
///macro to create an angle in microradian
#[macro_export]
macro_rules! microradian {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Angle, angle::radian};
        $crate::uom_unit_creator![radian, Angle, $( 1e-6*$x ),*]
    }};
}
///macro to create an angle in degree
#[macro_export]
macro_rules! degree {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Angle, angle::degree};
        $crate::uom_unit_creator![degree, Angle, $( $x ),*]
    }};
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use uom::si::{
        angle::radian,
        f64::Length,
        length::{meter, millimeter},
    };

    #[test]
    fn milliradian_test() {
        let rad = milliradian!(3.);
        assert_relative_eq!(rad.get::<radian>(), 3e-3);
    }
    #[test]
    fn microradian_test() {
        let rad = microradian!(3.);
        assert_relative_eq!(rad.get::<radian>(), 3e-6);
    }
    #[test]
    fn nanometer_test() {
        let wvl = nanometer!(253.0);
        assert_relative_eq!(wvl.get::<millimeter>(), 253e-6);
    }
    #[test]
    fn uom_unit_creator() {
        let meter1 = Length::new::<meter>(1.);
        let meter2 = uom_unit_creator!(meter, Length, 1.);
        assert_relative_eq!(meter1.value, meter2.value);

        let focals = millimeter!(-100., -50., 75.);
        assert_eq!(focals.len(), 3);
        assert_relative_eq!(focals[0].get::<millimeter>(), -100.0);
        assert_relative_eq!(focals[1].get::<millimeter>(), -50.0);
        assert_relative_eq!(focals[2].get::<millimeter>(), 75.0);

        let pair = uom_unit_creator!(meter, Length, 1., 2.);
        assert_eq!(pair.len(), 2);
        assert_relative_eq!(pair[1].value, 2.0);
    }
}
