quantity!(Volts, suffix: "V", precision: 2);
quantity!(Ohms, suffix: "Ω", precision: 4);
