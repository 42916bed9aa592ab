//! Fixed vehicle catalog.

use crate::models::{Category, Vehicle, VehicleId};

/// Seed fixture: brand, model, year, category.
const SEED: [(&str, &str, u16, Category); 15] = [
    ("Toyota", "Camry", 2020, Category::Sedan),
    ("Honda", "Civic", 2019, Category::Sedan),
    ("BMW", "3 Series", 2021, Category::Sedan),
    ("Mercedes", "C-Class", 2020, Category::Sedan),
    ("Audi", "A4", 2022, Category::Sedan),
    ("BMW", "X5", 2021, Category::Suv),
    ("Toyota", "Land Cruiser", 2018, Category::Suv),
    ("Mercedes", "GLE", 2020, Category::Suv),
    ("Audi", "Q7", 2021, Category::Suv),
    ("Jeep", "Wrangler", 2019, Category::Suv),
    ("Tesla", "Model 3", 2022, Category::Electric),
    ("Tesla", "Model Y", 2021, Category::Electric),
    ("Nissan", "Leaf", 2021, Category::Electric),
    ("Chevrolet", "Bolt", 2020, Category::Electric),
    ("Ford", "Mustang Mach-E", 2022, Category::Electric),
];

/// Vehicles indexed by identity, with a separate display order.
///
/// Identity never changes after construction; `order` is the only thing a
/// sort touches, so a [`VehicleId`] stays valid across re-orderings.
#[derive(Debug, Clone)]
pub struct Catalog {
    vehicles: Vec<Vehicle>,
    order: Vec<VehicleId>,
}

impl Catalog {
    /// Build a catalog from vehicle specs, assigning ids in input order.
    pub fn new<I, B, M>(specs: I) -> Self
    where
        I: IntoIterator<Item = (B, M, u16, Category)>,
        B: Into<String>,
        M: Into<String>,
    {
        let vehicles: Vec<Vehicle> = specs
            .into_iter()
            .enumerate()
            .map(|(index, (brand, model, year, category))| {
                Vehicle::new(VehicleId(index), brand, model, year, category)
            })
            .collect();
        let order = vehicles.iter().map(|vehicle| vehicle.id).collect();
        Self { vehicles, order }
    }

    /// The standard 15-vehicle fleet, five per category.
    pub fn seeded() -> Self {
        Self::new(SEED)
    }

    /// Number of vehicles.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether the catalog holds no vehicles.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Look up a vehicle by identity.
    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(id.0)
    }

    /// Resolve a display position into an identity.
    ///
    /// Positions shift after [`Catalog::sort_by_year`]; resolve again after sorting.
    pub fn at(&self, position: usize) -> Option<VehicleId> {
        self.order.get(position).copied()
    }

    /// Display position of a vehicle.
    pub fn position_of(&self, id: VehicleId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    /// Vehicles in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.order.iter().filter_map(move |id| self.vehicles.get(id.0))
    }

    /// First vehicle in display order whose brand and model match, ignoring case.
    pub fn find(&self, brand: &str, model: &str) -> Option<VehicleId> {
        self.iter()
            .find(|vehicle| vehicle.matches(brand, model))
            .map(|vehicle| vehicle.id)
    }

    /// Resolve a model written as leading words of free text.
    ///
    /// Tries the first word, then the first two, and so on, returning the
    /// shortest prefix that names a vehicle of `brand`. Anything after the
    /// model is ignored.
    pub fn find_leading(&self, brand: &str, text: &str) -> Option<VehicleId> {
        let words: Vec<&str> = text.split_whitespace().collect();
        (1..=words.len()).find_map(|count| self.find(brand, &words[..count].join(" ")))
    }

    /// Stable ascending sort of the display order by manufacture year.
    pub fn sort_by_year(&mut self) {
        let vehicles = &self.vehicles;
        self.order
            .sort_by_key(|id| vehicles.get(id.0).map(|vehicle| vehicle.year));
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_five_per_category() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.len(), 15);
        for category in Category::ALL {
            let count = catalog
                .iter()
                .filter(|vehicle| vehicle.category == category)
                .count();
            assert_eq!(count, 5, "{category}");
        }
        assert!(catalog.iter().all(Vehicle::is_available));
    }

    #[test]
    fn find_ignores_case() {
        let catalog = Catalog::seeded();
        let id = catalog.find("toyota", "LAND CRUISER").expect("land cruiser");
        assert_eq!(catalog.get(id).map(|v| v.year), Some(2018));
        assert!(catalog.find("Toyota", "Corolla").is_none());
    }

    #[test]
    fn find_leading_takes_shortest_model_prefix() {
        let catalog = Catalog::seeded();
        let camry = catalog.find("Toyota", "Camry");
        assert_eq!(catalog.find_leading("Toyota", "Camry | Total: $120.00"), camry);
        assert_eq!(
            catalog.find_leading("toyota", "Land Cruiser at noon"),
            catalog.find("Toyota", "Land Cruiser")
        );
        assert!(catalog.find_leading("Honda", "Camry").is_none());
        assert!(catalog.find_leading("Toyota", "").is_none());
    }

    #[test]
    fn sort_keeps_identity_and_ties() {
        let mut catalog = Catalog::seeded();
        let camry = catalog.find("Toyota", "Camry").expect("camry");
        catalog.sort_by_year();

        let years: Vec<u16> = catalog.iter().map(|vehicle| vehicle.year).collect();
        assert!(years.windows(2).all(|pair| pair[0] <= pair[1]));

        let labels_2020: Vec<String> = catalog
            .iter()
            .filter(|vehicle| vehicle.year == 2020)
            .map(Vehicle::label)
            .collect();
        assert_eq!(
            labels_2020,
            vec![
                "Toyota Camry",
                "Mercedes C-Class",
                "Mercedes GLE",
                "Chevrolet Bolt"
            ]
        );

        assert_eq!(catalog.get(camry).map(Vehicle::label).as_deref(), Some("Toyota Camry"));
        assert_eq!(catalog.at(0).and_then(|id| catalog.get(id)).map(|v| v.year), Some(2018));
        assert_ne!(catalog.position_of(camry), Some(0));
    }
}
