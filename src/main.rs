fn main() -> Result<(), Box<dyn std::error::Error>> {
    eda::cli::main()
}
