quantity!(WattHours, suffix: "Wh", precision: 1);
